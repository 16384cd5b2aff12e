//! Data model for a parsed SkySheet song.
//!
//! A song is an ordered list of chords; each chord is the set of keys
//! pressed at one instant. The model is built once by the parser and is
//! read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{ConvertError, Result, SourcePosition, TimingProblem};

/// Number of keys on the instrument grid (3 rows of 5).
pub const KEY_COUNT: u8 = 15;

/// Keys per row of the instrument grid.
pub const KEYS_PER_ROW: u8 = 5;

/// Group assumed when a key token has no numeric prefix.
pub const DEFAULT_GROUP: u8 = 1;

/// One physical key: an index on the 15-key grid within an octave group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KeyId {
    group: u8,
    index: u8,
}

impl KeyId {
    pub fn new(group: u8, index: u8) -> Option<Self> {
        (index < KEY_COUNT).then_some(Self { group, index })
    }

    /// Parse a key token: `1Key3`, `Key3`, `key3`, `NoteKey3` or a bare `3`.
    ///
    /// A numeric prefix is the group; any other prefix is ignored.
    /// Returns `None` when the token does not name a key in the universe.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let lower = token.to_ascii_lowercase();
        let (group, index) = match lower.find("key") {
            Some(pos) => {
                let prefix = &lower[..pos];
                let group = if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
                    parse_digits(prefix)?
                } else {
                    DEFAULT_GROUP
                };
                (group, parse_digits(&lower[pos + 3..])?)
            }
            None => (DEFAULT_GROUP, parse_digits(&lower)?),
        };
        Self::new(group, index)
    }

    /// Octave group (the `1` in `1Key3`).
    pub fn group(&self) -> u8 {
        self.group
    }

    /// Grid index 0..=14, row-major.
    pub fn index(&self) -> u8 {
        self.index
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Key{}", self.group, self.index)
    }
}

fn parse_digits(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Layout names for every key index in the universe, in grid order.
pub fn layout_key_names() -> impl Iterator<Item = String> {
    (0..KEY_COUNT).map(|i| format!("Key{i}"))
}

/// One key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub key: KeyId,
    pub time_ms: u64,
}

/// Keys pressed together at one timestamp, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    pub time_ms: u64,
    pub keys: Vec<KeyId>,
}

impl From<NoteEvent> for Chord {
    fn from(note: NoteEvent) -> Self {
        Self {
            time_ms: note.time_ms,
            keys: vec![note.key],
        }
    }
}

impl Chord {
    pub fn new(time_ms: u64) -> Self {
        Self {
            time_ms,
            keys: Vec::new(),
        }
    }

    pub fn contains(&self, key_index: u8) -> bool {
        self.keys.iter().any(|k| k.index == key_index)
    }
}

/// Optional descriptive fields, carried through to rendering untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SongMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub transcribed_by: Option<String>,
    pub bpm: Option<u32>,
    /// Any other named field found in the source
    pub extra: BTreeMap<String, String>,
}

/// A parsed song: chords in non-decreasing time order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SongModel {
    metadata: SongMetadata,
    chords: Vec<Chord>,
}

impl SongModel {
    /// Build a song from already-grouped chords, checking time order.
    pub fn from_chords(metadata: SongMetadata, chords: Vec<Chord>) -> Result<Self> {
        for (i, pair) in chords.windows(2).enumerate() {
            if pair[1].time_ms < pair[0].time_ms {
                return Err(ConvertError::Timing {
                    position: SourcePosition::Chord(i + 1),
                    found: pair[1].time_ms as i64,
                    reason: TimingProblem::Decreasing {
                        previous: pair[0].time_ms,
                    },
                });
            }
        }
        Ok(Self { metadata, chords })
    }

    pub fn metadata(&self) -> &SongMetadata {
        &self.metadata
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Total key presses across all chords.
    pub fn note_count(&self) -> usize {
        self.chords.iter().map(|c| c.keys.len()).sum()
    }

    /// Time from the first chord to the last one.
    pub fn duration_ms(&self) -> u64 {
        match (self.chords.first(), self.chords.last()) {
            (Some(first), Some(last)) => last.time_ms - first.time_ms,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_token_forms() {
        assert_eq!(KeyId::parse("1Key3"), KeyId::new(1, 3));
        assert_eq!(KeyId::parse("2Key14"), KeyId::new(2, 14));
        assert_eq!(KeyId::parse("Key0"), KeyId::new(1, 0));
        assert_eq!(KeyId::parse("key7"), KeyId::new(1, 7));
        assert_eq!(KeyId::parse("12"), KeyId::new(1, 12));
    }

    #[test]
    fn non_numeric_prefix_means_default_group() {
        assert_eq!(KeyId::parse("NoteKey3"), KeyId::new(1, 3));
        assert_eq!(KeyId::parse("xKey1"), KeyId::new(1, 1));
        assert_eq!(KeyId::parse("NoteKey15"), None);
    }

    #[test]
    fn rejects_tokens_outside_universe() {
        assert_eq!(KeyId::parse("Key15"), None);
        assert_eq!(KeyId::parse("99"), None);
        assert_eq!(KeyId::parse("Key"), None);
        assert_eq!(KeyId::parse("Key-1"), None);
        assert_eq!(KeyId::parse(""), None);
    }

    #[test]
    fn key_ids_only_exist_inside_the_grid() {
        for index in 0..=u8::MAX {
            assert_eq!(KeyId::new(1, index).is_some(), index < KEY_COUNT, "index {index}");
        }
        let key = KeyId::new(3, 14).unwrap();
        assert_eq!((key.group(), key.index()), (3, 14));
    }

    #[test]
    fn from_chords_rejects_decreasing_times() {
        let chords = vec![Chord::new(100), Chord::new(50)];
        let err = SongModel::from_chords(SongMetadata::default(), chords).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Timing { found: 50, position: SourcePosition::Chord(1), .. }
        ));
        assert!(err.to_string().contains("chord #1"), "{err}");
    }

    #[test]
    fn stats() {
        let k = KeyId::new(1, 0).unwrap();
        let chords = vec![
            Chord { time_ms: 200, keys: vec![k, k] },
            Chord { time_ms: 1700, keys: vec![k] },
        ];
        let song = SongModel::from_chords(SongMetadata::default(), chords).unwrap();
        assert_eq!(song.note_count(), 3);
        assert_eq!(song.duration_ms(), 1500);
    }
}
