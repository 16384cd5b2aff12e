//! Sheet header: title, credits, statistics and legend.

use super::html_builder::HtmlBuilder;
use super::SheetHeader;
use crate::i18n::Strings;
use crate::layout::LayoutMap;

pub(super) fn render_header(html: &mut HtmlBuilder, header: &SheetHeader, layout: &LayoutMap, strings: &Strings) {
    html.open("header", &[("class", "sheet-header")]);
    html.element("h1", &[], header.title.unwrap_or_else(|| strings.get("untitled")));

    if let Some(credits) = credits_line(header, strings) {
        html.element("div", &[("class", "author")], &credits);
    }

    let notes_count = header.note_count.to_string();
    let duration = format_duration(header.duration_ms, strings);
    html.element(
        "div",
        &[("class", "file-info")],
        &strings.format("notes", &[("notes_count", &notes_count), ("duration", &duration)]),
    );
    html.element(
        "div",
        &[("class", "layout-info")],
        &strings.format("layout", &[("layout", layout.name())]),
    );
    html.element("div", &[("class", "legend")], strings.get("legend"));
    html.close("header");
}

/// `Author: X | Transcribed by: Y`, or `None` when neither is known.
fn credits_line(header: &SheetHeader, strings: &Strings) -> Option<String> {
    let meta = header.metadata;
    let parts: Vec<String> = [
        ("author", meta.author.as_deref()),
        ("transcribed_by", meta.transcribed_by.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| format!("{}: {v}", strings.get(label))))
    .collect();
    (!parts.is_empty()).then(|| parts.join(" | "))
}

pub(super) fn format_duration(duration_ms: u64, strings: &Strings) -> String {
    let total_secs = duration_ms / 1000;
    let minutes = (total_secs / 60).to_string();
    let seconds = (total_secs % 60).to_string();
    strings.format("duration", &[("minutes", &minutes), ("seconds", &seconds)])
}
