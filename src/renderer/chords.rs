//! Rows of chord groups, gap slots and arrows.

use super::constants::ARROW;
use super::html_builder::HtmlBuilder;
use super::{ChordStyle, RenderOptions, SheetHeader};
use crate::i18n::Strings;
use crate::layout::LayoutMap;
use crate::model::{KEYS_PER_ROW, KEY_COUNT};
use crate::paginate::{PlacedChord, Row, Slot};

pub(super) struct RowContext<'a> {
    pub(super) layout: &'a LayoutMap,
    pub(super) header: &'a SheetHeader<'a>,
    pub(super) strings: &'a Strings<'a>,
    pub(super) options: &'a RenderOptions,
}

pub(super) fn render_row(html: &mut HtmlBuilder, row: &Row, ctx: &RowContext) {
    html.open("div", &[("class", "chord-row")]);
    for (i, slot) in row.slots.iter().enumerate() {
        if i > 0 && ctx.options.show_arrows {
            html.element("div", &[("class", "arrow")], ARROW);
        }
        match slot {
            Slot::Chord(placed) => render_chord(html, placed, ctx),
            Slot::Blank { gap_ms } => render_gap(html, *gap_ms),
        }
    }
    html.close("div");
}

fn render_chord(html: &mut HtmlBuilder, placed: &PlacedChord, ctx: &RowContext) {
    let index = placed.ordinal.to_string();
    let time = placed.chord.time_ms.to_string();
    html.open(
        "div",
        &[("class", "chord-group"), ("data-index", &index), ("data-time", &time)],
    );
    html.element("div", &[("class", "chord-label")], chord_label(placed.ordinal, ctx));

    match ctx.options.chord_style {
        ChordStyle::Keys => {
            html.open("div", &[("class", "chord")]);
            for (key, glyph) in placed.chord.keys.iter().zip(&placed.glyphs) {
                html.element("span", &[("class", "key"), ("data-key", &key.to_string())], glyph);
            }
            html.close("div");
        }
        ChordStyle::Keyboard => render_keyboard(html, placed, ctx.layout),
    }

    html.close("div");
}

/// The full 3×5 grid with the chord's keys highlighted.
fn render_keyboard(html: &mut HtmlBuilder, placed: &PlacedChord, layout: &LayoutMap) {
    html.open("div", &[("class", "chord keyboard")]);
    for row_start in (0..KEY_COUNT).step_by(KEYS_PER_ROW as usize) {
        html.open("div", &[("class", "keyboard-row")]);
        for index in row_start..row_start + KEYS_PER_ROW {
            let class = if placed.chord.contains(index) { "key active" } else { "key" };
            let id = format!("Key{index}");
            html.element(
                "div",
                &[("class", class), ("data-key", &id)],
                layout.glyph_at(index).unwrap_or(""),
            );
        }
        html.close("div");
    }
    html.close("div");
}

fn render_gap(html: &mut HtmlBuilder, gap_ms: u64) {
    let gap = gap_ms.to_string();
    html.open("div", &[("class", "gap-slot"), ("data-gap", &gap)]);
    html.element("div", &[("class", "chord-label")], "");
    html.element("div", &[("class", "chord")], "\u{2026}");
    html.close("div");
}

/// START on the first chord of the song, END on the last.
fn chord_label<'a>(ordinal: usize, ctx: &RowContext<'a>) -> &'a str {
    if !ctx.options.show_start_end {
        return "";
    }
    if ordinal == 0 {
        ctx.strings.get("start")
    } else if ordinal + 1 == ctx.header.chord_count {
        ctx.strings.get("end")
    } else {
        ""
    }
}
