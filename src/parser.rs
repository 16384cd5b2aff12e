//! Notation parser: validates a normalized sheet and groups it into chords.

use serde::Deserialize;
use tracing::debug;

use crate::detect::{self, SourceDocument};
use crate::error::{ConvertError, Result, TimingProblem};
use crate::model::*;

/// Default spacing between plain-text chords that carry no timestamp.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Parsing knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Gap inserted before each untimed plain-text chord
    pub default_interval_ms: u64,
    /// When set, notes whose offsets fall into the same window (counted from
    /// the first note) fold into one chord at the window's first timestamp.
    pub chord_window_ms: Option<u64>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_interval_ms: DEFAULT_INTERVAL_MS,
            chord_window_ms: None,
        }
    }
}

impl ParseOptions {
    pub fn validate(&self) -> Result<()> {
        if self.default_interval_ms == 0 {
            return Err(ConvertError::Config("default_interval_ms must be positive".into()));
        }
        if self.chord_window_ms == Some(0) {
            return Err(ConvertError::Config("chord_window_ms must be positive".into()));
        }
        Ok(())
    }
}

/// Detect the dialect of `data` and parse it into a song.
pub fn parse_bytes(data: &[u8], extension: Option<&str>, options: &ParseOptions) -> Result<SongModel> {
    options.validate()?;
    let doc = detect::detect(data, extension, options.default_interval_ms)?;
    parse_document(doc, options)
}

/// Parse already-decoded sheet text.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<SongModel> {
    options.validate()?;
    let doc = detect::detect_str(text, options.default_interval_ms)?;
    parse_document(doc, options)
}

/// Turn a normalized document into a song.
///
/// Keys are checked against the 15-key universe, timestamps must be
/// non-negative and non-decreasing, and consecutive notes sharing a
/// timestamp become one chord in source order. Duplicate keys inside a
/// chord are kept.
pub fn parse_document(doc: SourceDocument, options: &ParseOptions) -> Result<SongModel> {
    let mut chords: Vec<Chord> = Vec::new();
    let mut previous: Option<u64> = None;
    let mut first_time: Option<u64> = None;
    let mut current_window: Option<u64> = None;

    for note in &doc.notes {
        let key = KeyId::parse(&note.key).ok_or_else(|| ConvertError::UnknownKey {
            token: note.key.clone(),
            position: note.position,
        })?;

        let time = u64::try_from(note.time_ms).map_err(|_| ConvertError::Timing {
            position: note.position,
            found: note.time_ms,
            reason: TimingProblem::Negative,
        })?;
        if let Some(prev) = previous.filter(|&p| time < p) {
            return Err(ConvertError::Timing {
                position: note.position,
                found: note.time_ms,
                reason: TimingProblem::Decreasing { previous: prev },
            });
        }
        previous = Some(time);

        let joins_current = match options.chord_window_ms {
            Some(window) => {
                let origin = *first_time.get_or_insert(time);
                let bucket = (time - origin) / window;
                let same = current_window == Some(bucket);
                current_window = Some(bucket);
                same
            }
            None => chords.last().is_some_and(|c| c.time_ms == time),
        };

        let event = NoteEvent { key, time_ms: time };
        match chords.last_mut() {
            Some(chord) if joins_current => chord.keys.push(event.key),
            _ => chords.push(Chord::from(event)),
        }
    }

    debug!(
        chords = chords.len(),
        notes = doc.notes.len(),
        "song parsed"
    );
    SongModel::from_chords(doc.metadata, chords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourcePosition;
    use pretty_assertions::assert_eq;

    fn shape(song: &SongModel) -> Vec<(u64, Vec<String>)> {
        song.chords()
            .iter()
            .map(|c| (c.time_ms, c.keys.iter().map(|k| k.to_string()).collect()))
            .collect()
    }

    #[test]
    fn groups_equal_timestamps_in_source_order() {
        let song = parse_str("0: Key4 Key0\n0: Key2\n100: Key1\n", &ParseOptions::default()).unwrap();
        assert_eq!(
            shape(&song),
            vec![
                (0, vec!["1Key4".into(), "1Key0".into(), "1Key2".into()]),
                (100, vec!["1Key1".into()]),
            ]
        );
    }

    #[test]
    fn duplicate_keys_in_a_chord_are_preserved() {
        let song = parse_str("Key3 Key3 Key5\n", &ParseOptions::default()).unwrap();
        assert_eq!(song.chords()[0].keys.len(), 3);
        assert_eq!(song.note_count(), 3);
    }

    #[test]
    fn empty_input_is_an_empty_song() {
        let song = parse_str("", &ParseOptions::default()).unwrap();
        assert!(song.is_empty());
        let song = parse_str("# nothing here\n\n", &ParseOptions::default()).unwrap();
        assert!(song.is_empty());
    }

    #[test]
    fn unknown_key_names_token_and_position() {
        let err = parse_str("Key1\nKey2 99\n", &ParseOptions::default()).unwrap_err();
        match err {
            ConvertError::UnknownKey { token, position } => {
                assert_eq!(token, "99");
                assert_eq!(position, SourcePosition::Line(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = parse_str(r#"[{"time":-5,"key":"1Key1"}]"#, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Timing { found: -5, reason: TimingProblem::Negative, .. }
        ));
    }

    #[test]
    fn decreasing_time_is_rejected() {
        let json = r#"[{"time":300,"key":"1Key1"},{"time":200,"key":"1Key2"}]"#;
        let err = parse_str(json, &ParseOptions::default()).unwrap_err();
        match err {
            ConvertError::Timing { position, found, reason } => {
                assert_eq!(position, SourcePosition::Note(1));
                assert_eq!(found, 200);
                assert_eq!(reason, TimingProblem::Decreasing { previous: 300 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_interval_spaces_untimed_chords() {
        let options = ParseOptions {
            default_interval_ms: 250,
            ..ParseOptions::default()
        };
        let song = parse_str("Key0\nKey1\nKey2\n", &options).unwrap();
        let times: Vec<u64> = song.chords().iter().map(|c| c.time_ms).collect();
        assert_eq!(times, vec![0, 250, 500]);
    }

    #[test]
    fn chord_window_folds_near_notes() {
        let json = r#"[{"time":1000,"key":"1Key0"},{"time":1040,"key":"1Key1"},
                       {"time":1100,"key":"1Key2"},{"time":1199,"key":"1Key3"},{"time":1350,"key":"1Key4"}]"#;
        let options = ParseOptions {
            chord_window_ms: Some(100),
            ..ParseOptions::default()
        };
        let song = parse_str(json, &options).unwrap();
        assert_eq!(
            shape(&song),
            vec![
                (1000, vec!["1Key0".into(), "1Key1".into()]),
                (1100, vec!["1Key2".into(), "1Key3".into()]),
                (1350, vec!["1Key4".into()]),
            ]
        );
    }

    #[test]
    fn zero_chord_window_is_a_config_error() {
        let options = ParseOptions {
            chord_window_ms: Some(0),
            ..ParseOptions::default()
        };
        assert!(matches!(parse_str("Key1", &options), Err(ConvertError::Config(_))));
    }

    #[test]
    fn zero_interval_is_a_config_error() {
        let options = ParseOptions {
            default_interval_ms: 0,
            ..ParseOptions::default()
        };
        let err = parse_str("Key0\nKey1\nKey2\n", &options).unwrap_err();
        assert!(matches!(err, ConvertError::Config(ref m) if m.contains("default_interval_ms")));
    }

    #[test]
    fn json_note_prefixes_are_ignored() {
        let json = r#"[{"name":"x","songNotes":[{"time":0,"key":"NoteKey3"},{"time":0,"key":"2Key4"}]}]"#;
        let song = parse_str(json, &ParseOptions::default()).unwrap();
        assert_eq!(shape(&song), vec![(0, vec!["1Key3".to_string(), "2Key4".to_string()])]);
    }

    #[test]
    fn metadata_passes_through() {
        let song = parse_str("@title Ode\n@author Someone\n@transcribedBy Me\nKey1\n", &ParseOptions::default()).unwrap();
        assert_eq!(song.metadata().title.as_deref(), Some("Ode"));
        assert_eq!(song.metadata().author.as_deref(), Some("Someone"));
        assert_eq!(song.metadata().transcribed_by.as_deref(), Some("Me"));
    }
}
