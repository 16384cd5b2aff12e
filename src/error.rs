//! Error taxonomy for a conversion run.
//!
//! Every failure terminates the run before any HTML is produced. Each
//! variant carries enough context (line, token, id) to be shown verbatim.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Where a note came from in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePosition {
    /// 1-based line of the plain-text dialect
    Line(usize),
    /// 0-based index into the JSON `songNotes` array
    Note(usize),
    /// 0-based index of an already-grouped chord
    Chord(usize),
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePosition::Line(line) => write!(f, "line {line}"),
            SourcePosition::Note(idx) => write!(f, "note #{idx}"),
            SourcePosition::Chord(idx) => write!(f, "chord #{idx}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input matches neither the JSON nor the plain-text dialect.
    #[error("malformed input at line {line}, column {column}: {message}")]
    MalformedInput {
        line: usize,
        column: usize,
        message: String,
    },

    /// A key token outside the fixed key-id universe.
    #[error("unknown key '{token}' at {position}")]
    UnknownKey {
        token: String,
        position: SourcePosition,
    },

    /// Negative or decreasing timestamp.
    #[error("invalid timing at {position}: {found} ms {reason}")]
    Timing {
        position: SourcePosition,
        found: i64,
        reason: TimingProblem,
    },

    #[error("custom layout could not be parsed: {0}")]
    LayoutParse(String),

    /// Custom layout leaves some key ids without a glyph.
    #[error("custom layout is missing glyphs for: {}", .missing.join(", "))]
    LayoutIncomplete { missing: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a timestamp was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingProblem {
    Negative,
    Decreasing { previous: u64 },
}

impl fmt::Display for TimingProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingProblem::Negative => f.write_str("is negative"),
            TimingProblem::Decreasing { previous } => {
                write!(f, "comes before the previous timestamp {previous} ms")
            }
        }
    }
}

impl ConvertError {
    /// Process exit status the CLI wrapper reports for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Io { .. } => 1,
            ConvertError::MalformedInput { .. } => 2,
            ConvertError::UnknownKey { .. } => 3,
            ConvertError::Timing { .. } => 4,
            ConvertError::LayoutParse(_) => 5,
            ConvertError::LayoutIncomplete { .. } => 6,
            ConvertError::Config(_) => 7,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
