//! Pagination: packs chords into fixed-capacity rows and rows into pages.
//!
//! Breaks are driven purely by capacity, never by time, so the same song
//! and config always produce the same pages. Each placed chord carries its
//! glyphs already resolved through the layout.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::layout::LayoutMap;
use crate::model::{Chord, SongModel};

pub const DEFAULT_ROW_CAPACITY: usize = 4;
pub const DEFAULT_ROWS_PER_PAGE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Chords (and blanks) per row
    pub row_capacity: usize,
    /// Rows per printed page
    pub rows_per_page: usize,
    /// When set, a blank slot marks each gap longer than this between chords.
    pub gap_placeholder_ms: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            row_capacity: DEFAULT_ROW_CAPACITY,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            gap_placeholder_ms: None,
        }
    }
}

impl PaginationConfig {
    pub fn new(row_capacity: usize, rows_per_page: usize) -> Result<Self> {
        let config = Self {
            row_capacity,
            rows_per_page,
            gap_placeholder_ms: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_capacity == 0 {
            return Err(ConvertError::Config("row_capacity must be positive".into()));
        }
        if self.rows_per_page == 0 {
            return Err(ConvertError::Config("rows_per_page must be positive".into()));
        }
        Ok(())
    }
}

/// A chord placed on a page, with one glyph per key in chord order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedChord<'a> {
    /// Position of the chord in the song
    pub ordinal: usize,
    pub chord: &'a Chord,
    pub glyphs: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<'a> {
    Chord(PlacedChord<'a>),
    /// Stands for a long pause before the next chord
    Blank { gap_ms: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row<'a> {
    pub slots: Vec<Slot<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number
    pub number: usize,
    pub rows: Vec<Row<'a>>,
}

impl Page<'_> {
    /// Slot counts per row, e.g. `[4, 4, 2]`.
    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.slots.len()).collect()
    }
}

/// Validated pagination settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Lay out the whole song. An empty song gives one page with no rows.
    pub fn paginate<'a>(&self, song: &'a SongModel, layout: &'a LayoutMap) -> Vec<Page<'a>> {
        let mut builder = PageBuilder::new(self.config);
        let mut previous_time: Option<u64> = None;

        for (ordinal, chord) in song.chords().iter().enumerate() {
            if let (Some(threshold), Some(prev)) = (self.config.gap_placeholder_ms, previous_time) {
                let gap = chord.time_ms - prev;
                if gap > threshold {
                    builder.place(Slot::Blank { gap_ms: gap });
                }
            }
            previous_time = Some(chord.time_ms);

            builder.place(Slot::Chord(PlacedChord {
                ordinal,
                chord,
                glyphs: chord.keys.iter().map(|&k| layout.glyph(k)).collect(),
            }));
        }

        let pages = builder.finish();
        debug!(pages = pages.len(), chords = song.chords().len(), "song paginated");
        pages
    }
}

struct PageBuilder<'a> {
    config: PaginationConfig,
    pages: Vec<Page<'a>>,
    rows: Vec<Row<'a>>,
    row: Row<'a>,
}

impl<'a> PageBuilder<'a> {
    fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            rows: Vec::new(),
            row: Row::default(),
        }
    }

    fn place(&mut self, slot: Slot<'a>) {
        self.row.slots.push(slot);
        if self.row.slots.len() == self.config.row_capacity {
            self.rows.push(std::mem::take(&mut self.row));
            if self.rows.len() == self.config.rows_per_page {
                self.close_page();
            }
        }
    }

    fn close_page(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        self.pages.push(Page {
            number: self.pages.len() + 1,
            rows,
        });
    }

    fn finish(mut self) -> Vec<Page<'a>> {
        if !self.row.slots.is_empty() {
            self.rows.push(std::mem::take(&mut self.row));
        }
        if !self.rows.is_empty() || self.pages.is_empty() {
            self.close_page();
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BuiltinLayout;
    use crate::model::{KeyId, SongMetadata};
    use pretty_assertions::assert_eq;

    fn song_with(times: &[u64]) -> SongModel {
        let key = KeyId::new(1, 0).unwrap();
        let chords = times
            .iter()
            .map(|&time_ms| Chord { time_ms, keys: vec![key] })
            .collect();
        SongModel::from_chords(SongMetadata::default(), chords).unwrap()
    }

    fn shape(pages: &[Page]) -> Vec<Vec<usize>> {
        pages.iter().map(Page::row_lengths).collect()
    }

    fn paginate_shape(count: u64, config: PaginationConfig) -> Vec<Vec<usize>> {
        let song = song_with(&(0..count).map(|i| i * 100).collect::<Vec<_>>());
        let pages = Paginator::new(config).unwrap().paginate(&song, BuiltinLayout::Qwerty.map());
        shape(&pages)
    }

    #[test]
    fn ten_and_thirteen_chords() {
        let config = PaginationConfig::new(4, 3).unwrap();
        assert_eq!(paginate_shape(10, config), vec![vec![4, 4, 2]]);
        assert_eq!(paginate_shape(13, config), vec![vec![4, 4, 4], vec![1]]);
    }

    #[test]
    fn exact_fill_leaves_no_trailing_page() {
        let config = PaginationConfig::new(4, 3).unwrap();
        assert_eq!(paginate_shape(12, config), vec![vec![4, 4, 4]]);
        assert_eq!(paginate_shape(24, config), vec![vec![4, 4, 4], vec![4, 4, 4]]);
    }

    #[test]
    fn empty_song_is_one_empty_page() {
        let song = SongModel::default();
        let pages = Paginator::new(PaginationConfig::default())
            .unwrap()
            .paginate(&song, BuiltinLayout::Qwertz.map());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].rows.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(PaginationConfig::new(0, 3), Err(ConvertError::Config(_))));
        assert!(matches!(PaginationConfig::new(3, 0), Err(ConvertError::Config(_))));
        let bad = PaginationConfig { row_capacity: 0, ..PaginationConfig::default() };
        assert!(Paginator::new(bad).is_err());
    }

    #[test]
    fn large_gaps_do_not_break_rows() {
        let song = song_with(&[0, 10, 60_000, 60_010]);
        let pages = Paginator::new(PaginationConfig::new(4, 3).unwrap())
            .unwrap()
            .paginate(&song, BuiltinLayout::Qwerty.map());
        assert_eq!(shape(&pages), vec![vec![4]]);
    }

    #[test]
    fn gap_placeholders_take_a_slot() {
        let song = song_with(&[0, 100, 5_000, 5_100]);
        let config = PaginationConfig {
            gap_placeholder_ms: Some(1_000),
            ..PaginationConfig::new(3, 2).unwrap()
        };
        let pages = Paginator::new(config).unwrap().paginate(&song, BuiltinLayout::Qwerty.map());
        assert_eq!(shape(&pages), vec![vec![3, 2]]);
        assert_eq!(pages[0].rows[0].slots[2], Slot::Blank { gap_ms: 4_900 });
    }

    #[test]
    fn order_and_glyphs_survive_any_capacity() {
        let song = song_with(&(0..17).map(|i| i * 10).collect::<Vec<_>>());
        for cap in 1..6 {
            for rows in 1..4 {
                let config = PaginationConfig::new(cap, rows).unwrap();
                let pages = Paginator::new(config).unwrap().paginate(&song, BuiltinLayout::Qwerty.map());
                let ordinals: Vec<usize> = pages
                    .iter()
                    .flat_map(|p| &p.rows)
                    .flat_map(|r| &r.slots)
                    .filter_map(|s| match s {
                        Slot::Chord(c) => Some(c.ordinal),
                        Slot::Blank { .. } => None,
                    })
                    .collect();
                assert_eq!(ordinals, (0..17).collect::<Vec<_>>());
                let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
                assert_eq!(numbers, (1..=pages.len()).collect::<Vec<_>>());
            }
        }
    }
}
