//! Sheet renderer: converts paginated chords into a standalone HTML page.
//!
//! The output carries its own CSS (screen and print rules) and never
//! references external assets, so it opens straight from disk. Rendering
//! is a pure function of its inputs: the same pages, layout and strings
//! always give byte-identical output.

mod chords;
mod constants;
mod header;
mod html_builder;
mod styles;

use serde::Deserialize;

use crate::i18n::Strings;
use crate::layout::LayoutMap;
use crate::model::{SongMetadata, SongModel};
use crate::paginate::Page;
use chords::{render_row, RowContext};
use header::render_header;
use html_builder::HtmlBuilder;
use styles::stylesheet;

// ═══════════════════════════════════════════════════════════════════════
// Options
// ═══════════════════════════════════════════════════════════════════════

/// How each chord is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordStyle {
    /// One glyph per pressed key, in source order (duplicates repeated)
    #[default]
    Keys,
    /// The whole 3×5 grid with pressed keys highlighted
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub chord_style: ChordStyle,
    /// Arrows between neighbouring chords of a row
    pub show_arrows: bool,
    /// START / END labels on the first and last chord
    pub show_start_end: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chord_style: ChordStyle::Keys,
            show_arrows: true,
            show_start_end: true,
        }
    }
}

/// Everything the header shows about a song.
#[derive(Debug, Clone, Copy)]
pub struct SheetHeader<'a> {
    /// Display title; the localized "untitled" string when `None`
    pub title: Option<&'a str>,
    pub metadata: &'a SongMetadata,
    pub note_count: usize,
    pub chord_count: usize,
    pub duration_ms: u64,
}

impl<'a> SheetHeader<'a> {
    /// Header for `song`, titled from its metadata or else `fallback_title`.
    pub fn for_song(song: &'a SongModel, fallback_title: Option<&'a str>) -> Self {
        let title = song
            .metadata()
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(fallback_title);
        Self {
            title,
            metadata: song.metadata(),
            note_count: song.note_count(),
            chord_count: song.chords().len(),
            duration_ms: song.duration_ms(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render paginated chords into a complete HTML document.
///
/// No validation happens here; pages are trusted to come from a song that
/// already resolved through `layout`.
pub fn render_html(
    pages: &[Page],
    layout: &LayoutMap,
    header: &SheetHeader,
    strings: &Strings,
    options: &RenderOptions,
) -> String {
    let title = header.title.unwrap_or_else(|| strings.get("untitled"));
    let mut html = HtmlBuilder::new();

    html.line("<!DOCTYPE html>");
    html.open("html", &[("lang", strings.locale())]);

    html.open("head", &[]);
    html.line("<meta charset=\"UTF-8\">");
    html.line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    html.element("title", &[], title);
    html.open("style", &[]);
    html.raw_block(&stylesheet(title, strings.get("page")));
    html.close("style");
    html.close("head");

    html.open("body", &[]);
    html.open("main", &[("class", "sheet")]);
    render_header(&mut html, header, layout, strings);

    if header.chord_count == 0 {
        html.element("p", &[("class", "empty")], strings.get("empty"));
    }

    let ctx = RowContext {
        layout,
        header,
        strings,
        options,
    };
    let total = pages.len().to_string();
    for page in pages {
        let number = page.number.to_string();
        html.open("section", &[("class", "page"), ("data-page", &number)]);
        html.element(
            "div",
            &[("class", "page-label")],
            &strings.format("page", &[("page", &number), ("pages", &total)]),
        );
        for row in &page.rows {
            render_row(&mut html, row, &ctx);
        }
        html.close("section");
    }

    let version = env!("CARGO_PKG_VERSION");
    html.element("footer", &[], &strings.format("footer", &[("version", version)]));
    html.close("main");
    html.close("body");
    html.close("html");

    html.build()
}
