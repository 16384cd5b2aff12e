//! Format detection: turns raw sheet bytes into one canonical document.
//!
//! Two dialects are understood:
//!   - JSON: the SkySheet export (`[{"name": .., "songNotes": [..]}]`), a
//!     single song object, or a bare array of `{"time", "key"}` objects
//!   - plain text: one chord per line, optional `<ms>:` timestamp prefix
//!
//! Content decides, not the file extension: JSON is tried first and the
//! line grammar is the fallback.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ConvertError, Result, SourcePosition};
use crate::model::SongMetadata;

/// Which grammar a document was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Json,
    PlainText,
}

/// One key press as written in the source, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNote {
    pub key: String,
    pub time_ms: i64,
    pub position: SourcePosition,
}

/// Dialect-independent view of a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub dialect: Dialect,
    pub metadata: SongMetadata,
    pub notes: Vec<RawNote>,
}

/// Decode, sniff and normalize raw sheet bytes.
///
/// `extension` is only a hint; a mismatch with the sniffed dialect is logged.
/// `default_interval_ms` spaces plain-text chords that carry no timestamp.
pub fn detect(data: &[u8], extension: Option<&str>, default_interval_ms: u64) -> Result<SourceDocument> {
    let text = decode_text(data)?;
    let doc = detect_str(&text, default_interval_ms)?;

    let expected = match extension.map(|e| e.to_ascii_lowercase()) {
        Some(ref e) if e == "json" => Some(Dialect::Json),
        Some(ref e) if e == "txt" => Some(Dialect::PlainText),
        _ => None,
    };
    if let Some(expected) = expected.filter(|&d| d != doc.dialect) {
        warn!(?expected, found = ?doc.dialect, "file extension does not match content");
    }
    debug!(dialect = ?doc.dialect, notes = doc.notes.len(), "sheet normalized");
    Ok(doc)
}

/// Sniff and normalize already-decoded text.
pub fn detect_str(text: &str, default_interval_ms: u64) -> Result<SourceDocument> {
    let json_err = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if value.is_array() || value.is_object() => return normalize_json(value),
        // Scalars such as a lone `3` are valid JSON but read better as text.
        Ok(_) => None,
        Err(e) => Some(e),
    };

    match parse_plain_text(text, default_interval_ms) {
        Ok(doc) => Ok(doc),
        Err(text_err) => {
            let looks_like_json = matches!(text.trim_start().chars().next(), Some('[' | '{'));
            match json_err {
                Some(e) if looks_like_json => Err(ConvertError::MalformedInput {
                    line: e.line(),
                    column: e.column(),
                    message: format!("invalid JSON: {e}"),
                }),
                _ => Err(text_err),
            }
        }
    }
}

// ─── Encoding ────────────────────────────────────────────────────────

/// Decode UTF-8 (with or without BOM) or UTF-16 with BOM.
///
/// BOM-less UTF-16LE is recognised by a zero high byte on the first unit,
/// which is how in-game exports of plain ASCII sheets look.
pub fn decode_text(data: &[u8]) -> Result<Cow<'_, str>> {
    match data {
        [0xEF, 0xBB, 0xBF, rest @ ..] => decode_utf8(rest, 3),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [lo, 0, ..] if *lo != 0 && data.len() % 2 == 0 => {
            debug!("no BOM, assuming UTF-16LE");
            decode_utf16(data, u16::from_le_bytes)
        }
        _ => decode_utf8(data, 0),
    }
}

fn decode_utf8(data: &[u8], bom_len: usize) -> Result<Cow<'_, str>> {
    std::str::from_utf8(data).map(Cow::Borrowed).map_err(|e| {
        let valid = &data[..e.valid_up_to()];
        // The prefix is valid UTF-8 by construction.
        let prefix = String::from_utf8_lossy(valid);
        let line = prefix.matches('\n').count() + 1;
        let column = prefix.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        ConvertError::MalformedInput {
            line,
            column,
            message: format!("invalid UTF-8 at byte offset {}", bom_len + e.valid_up_to()),
        }
    })
}

fn decode_utf16(data: &[u8], unit: fn([u8; 2]) -> u16) -> Result<Cow<'_, str>> {
    if data.len() % 2 != 0 {
        return Err(ConvertError::MalformedInput {
            line: 1,
            column: 1,
            message: "UTF-16 input has an odd number of bytes".into(),
        });
    }
    let units: Vec<u16> = data.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units)
        .map(Cow::Owned)
        .map_err(|e| ConvertError::MalformedInput {
            line: 1,
            column: 1,
            message: format!("invalid UTF-16: {e}"),
        })
}

// ─── JSON dialect ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSheet {
    Songs(Vec<JsonSong>),
    Song(JsonSong),
    Notes(Vec<JsonNote>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSong {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    transcribed_by: Option<String>,
    #[serde(default)]
    bpm: Option<serde_json::Value>,
    #[serde(alias = "notes")]
    song_notes: Vec<JsonNote>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct JsonNote {
    time: JsonTime,
    key: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTime {
    Int(i64),
    Float(f64),
}

impl JsonTime {
    fn as_ms(&self) -> i64 {
        match *self {
            JsonTime::Int(t) => t,
            JsonTime::Float(t) => t.floor() as i64,
        }
    }
}

fn normalize_json(value: serde_json::Value) -> Result<SourceDocument> {
    let sheet: JsonSheet = serde_json::from_value(value).map_err(|e| ConvertError::MalformedInput {
        line: 1,
        column: 1,
        message: format!("JSON does not describe a SkySheet song: {e}"),
    })?;

    let (metadata, notes) = match sheet {
        JsonSheet::Songs(songs) => {
            if songs.len() > 1 {
                warn!(count = songs.len(), "sheet holds several songs, converting the first");
            }
            match songs.into_iter().next() {
                Some(song) => song_parts(song),
                None => (SongMetadata::default(), Vec::new()),
            }
        }
        JsonSheet::Song(song) => song_parts(song),
        JsonSheet::Notes(notes) => (SongMetadata::default(), notes),
    };

    let notes = notes
        .into_iter()
        .enumerate()
        .map(|(i, n)| RawNote {
            time_ms: n.time.as_ms(),
            key: n.key,
            position: SourcePosition::Note(i),
        })
        .collect();

    Ok(SourceDocument {
        dialect: Dialect::Json,
        metadata,
        notes,
    })
}

fn song_parts(song: JsonSong) -> (SongMetadata, Vec<JsonNote>) {
    let bpm = song.bpm.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64().and_then(|b| u32::try_from(b).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    let extra = song
        .extra
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            serde_json::Value::Number(n) => Some((k, n.to_string())),
            serde_json::Value::Bool(b) => Some((k, b.to_string())),
            _ => None,
        })
        .collect();

    let metadata = SongMetadata {
        title: non_empty(song.name),
        author: non_empty(song.author),
        transcribed_by: non_empty(song.transcribed_by),
        bpm,
        extra,
    };
    (metadata, song.song_notes)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ─── Plain-text dialect ──────────────────────────────────────────────

/// Parse the line-oriented dialect.
///
/// ```text
/// # comment
/// @title Ode
/// @bpm 120
/// Key0 Key4          <- at 0 ms
/// 1Key5,1Key7        <- at 0 + interval
/// -                  <- rest, advances the clock
/// 2400: Key14        <- explicit time
/// ```
pub fn parse_plain_text(text: &str, default_interval_ms: u64) -> Result<SourceDocument> {
    let mut metadata = SongMetadata::default();
    let mut notes = Vec::new();
    let mut next_time: i64 = 0;
    let interval = i64::try_from(default_interval_ms).unwrap_or(i64::MAX);

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(directive) = line.strip_prefix('@') {
            parse_directive(directive, line_no, &mut metadata)?;
            continue;
        }

        if line == "-" {
            next_time = next_time.saturating_add(interval);
            continue;
        }

        let (time, body, body_col) = match line.split_once(':') {
            Some((stamp, rest)) => {
                let time = stamp.trim().parse::<i64>().map_err(|_| ConvertError::MalformedInput {
                    line: line_no,
                    column: column_of(raw_line, line),
                    message: format!("invalid timestamp '{}'", stamp.trim()),
                })?;
                (time, rest, column_of(raw_line, rest))
            }
            None => (next_time, line, column_of(raw_line, line)),
        };

        for (offset, token) in split_tokens(body) {
            if let Some(bad) = token.chars().position(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
                return Err(ConvertError::MalformedInput {
                    line: line_no,
                    column: body_col + body[..offset].chars().count() + bad,
                    message: format!("unexpected character in key token '{token}'"),
                });
            }
            notes.push(RawNote {
                key: token.to_string(),
                time_ms: time,
                position: SourcePosition::Line(line_no),
            });
        }
        next_time = time.saturating_add(interval);
    }

    Ok(SourceDocument {
        dialect: Dialect::PlainText,
        metadata,
        notes,
    })
}

fn parse_directive(directive: &str, line_no: usize, metadata: &mut SongMetadata) -> Result<()> {
    let (name, value) = directive
        .split_once(char::is_whitespace)
        .map(|(n, v)| (n, v.trim()))
        .unwrap_or((directive, ""));

    if name.is_empty() {
        return Err(ConvertError::MalformedInput {
            line: line_no,
            column: 2,
            message: "directive name missing after '@'".into(),
        });
    }

    let value = value.to_string();
    match name.to_ascii_lowercase().as_str() {
        "title" | "name" => metadata.title = non_empty(Some(value)),
        "author" => metadata.author = non_empty(Some(value)),
        "transcribedby" => metadata.transcribed_by = non_empty(Some(value)),
        "bpm" => {
            let bpm = value.parse().map_err(|_| ConvertError::MalformedInput {
                line: line_no,
                column: name.len() + 3,
                message: format!("bpm must be a positive integer, got '{value}'"),
            })?;
            metadata.bpm = Some(bpm);
        }
        _ => {
            metadata.extra.insert(name.to_string(), value);
        }
    }
    Ok(())
}

/// Split a chord body on whitespace, `,` or `+`, keeping byte offsets.
fn split_tokens(body: &str) -> Vec<(usize, &str)> {
    let is_sep = |c: char| c.is_whitespace() || c == ',' || c == '+';
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in body.char_indices() {
        match (is_sep(c), start) {
            (true, Some(s)) => {
                tokens.push((s, &body[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &body[s..]));
    }
    tokens
}

/// 1-based column of `part` (a subslice) inside `line`.
fn column_of(line: &str, part: &str) -> usize {
    let offset = (part.as_ptr() as usize).saturating_sub(line.as_ptr() as usize);
    line.get(..offset).map_or(0, |p| p.chars().count()) + 1
}
