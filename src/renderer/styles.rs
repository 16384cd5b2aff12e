//! Embedded stylesheet: one rule set for screens, one for print.

use super::constants::*;
use super::html_builder::css_string;

/// The complete `<style>` body.
///
/// `print_title` heads every printed page after the first; `page_template`
/// is the localized "Page {page} of {pages}" string, turned into CSS counters.
pub(super) fn stylesheet(print_title: &str, page_template: &str) -> String {
    format!(
        "{}\n{}\n{}",
        screen_rules(),
        keyboard_rules(),
        print_rules(print_title, page_template)
    )
}

fn screen_rules() -> String {
    format!(
        r#"
* {{ box-sizing: border-box; margin: 0; padding: 0; }}
body {{ font-family: Arial, sans-serif; background-color: {BACKGROUND}; color: {TEXT_COLOR}; padding: 20px; }}
.sheet {{ max-width: {MAX_CONTENT_WIDTH}; margin: 0 auto; display: flex; flex-direction: column; gap: 20px; }}
.sheet-header {{ text-align: center; display: flex; flex-direction: column; gap: 10px; }}
h1 {{ color: {ACCENT_COLOR}; font-size: 2.8em; }}
.author, .file-info, .layout-info {{ color: {MUTED_COLOR}; font-size: 18px; }}
.legend {{ margin: 0 auto; padding: 15px; background: {SURFACE}; border-radius: 8px; max-width: 600px; font-size: 18px; }}
.empty {{ text-align: center; color: {MUTED_COLOR}; }}
.page {{ background-color: {SURFACE}; border-radius: 12px; padding: 20px; display: flex; flex-direction: column; gap: 20px; }}
.page-label {{ text-align: right; color: {MUTED_COLOR}; font-size: 14px; }}
.chord-row {{ display: flex; flex-wrap: wrap; justify-content: center; align-items: flex-end; gap: 20px; }}
.chord-group, .gap-slot {{ display: flex; flex-direction: column; align-items: center; }}
.chord-label {{ height: 20px; margin-bottom: 10px; font-weight: bold; font-size: 16px; color: {LABEL_COLOR}; }}
.chord {{ display: flex; flex-wrap: wrap; justify-content: center; gap: 8px; padding: 15px 10px; border: 2px solid {KEY_SURFACE}; border-radius: 8px; background-color: {CHORD_SURFACE}; min-width: 80px; }}
.key {{ width: {KEY_WIDTH}; height: {KEY_HEIGHT}; display: flex; align-items: center; justify-content: center; border: 2px solid {ACTIVE_KEY_BORDER}; border-radius: 8px; background-color: {ACTIVE_KEY}; color: white; font-weight: bold; font-size: {KEY_FONT_SIZE}; user-select: none; }}
.gap-slot .chord {{ border-style: dashed; background: none; color: {MUTED_COLOR}; min-width: 40px; }}
.arrow {{ font-size: 24px; color: {ACCENT_COLOR}; min-width: 30px; text-align: center; align-self: center; }}
footer {{ text-align: center; color: {MUTED_COLOR}; font-size: 14px; padding: 10px 20px; border-top: 1px solid {KEY_SURFACE}; }}
"#
    )
}

fn keyboard_rules() -> String {
    format!(
        r#"
.keyboard {{ display: flex; flex-direction: column; gap: 6px; }}
.keyboard-row {{ display: flex; justify-content: center; gap: 6px; }}
.keyboard .key {{ width: {GRID_KEY_WIDTH}; height: {GRID_KEY_HEIGHT}; background-color: {KEY_SURFACE}; border-color: {KEY_BORDER}; color: #dddddd; font-size: 18px; }}
.keyboard .key.active {{ background-color: {ACTIVE_KEY}; border-color: {ACTIVE_KEY_BORDER}; color: white; }}
"#
    )
}

fn print_rules(print_title: &str, page_template: &str) -> String {
    let title = css_string(print_title);
    let counter = css_counter_content(page_template);
    format!(
        r#"
@media print {{
  @page {{
    margin: {PRINT_MARGIN_TOP} {PRINT_MARGIN_SIDE} {PRINT_MARGIN_BOTTOM} {PRINT_MARGIN_SIDE};
    size: auto;
    @top-center {{ content: {title}; font-size: 16pt; font-weight: bold; }}
    @bottom-center {{ content: {counter}; font-size: 11pt; }}
  }}
  @page :first {{ @top-center {{ content: ""; }} }}
  body {{ background-color: white !important; color: #000 !important; padding: 0 !important; font-size: 10pt; }}
  .sheet {{ max-width: 100% !important; }}
  h1 {{ color: #000 !important; font-size: 22pt !important; }}
  .author, .file-info, .layout-info, .legend {{ color: #000 !important; background-color: white !important; font-size: 12pt; }}
  .page {{ background-color: white !important; padding: 0 !important; page-break-after: always; break-after: page; }}
  .page:last-of-type {{ page-break-after: auto; break-after: auto; }}
  .page-label, footer {{ display: none !important; }}
  .chord-row {{ page-break-inside: avoid; break-inside: avoid; gap: 10px; }}
  .chord {{ border: 1px solid #999 !important; background-color: white !important; padding: 8px !important; }}
  .key {{ background-color: {PRINT_ACTIVE_KEY} !important; color: #000 !important; border: 2px solid {PRINT_ACTIVE_BORDER} !important; font-size: {PRINT_KEY_FONT_SIZE} !important; }}
  .keyboard .key {{ background-color: #f8f8f8 !important; border: 1px solid #666 !important; }}
  .keyboard .key.active {{ background-color: {PRINT_ACTIVE_KEY} !important; border: 2px solid {PRINT_ACTIVE_BORDER} !important; }}
  .chord-label, .arrow {{ color: #000 !important; }}
}}
"#
    )
}

/// Turn `"Page {page} of {pages}"` into `"Page " counter(page) " of " counter(pages)`.
pub(super) fn css_counter_content(template: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let counter = match name {
            "page" => "counter(page)",
            "pages" => "counter(pages)",
            _ => {
                // Not a counter, keep the text as written.
                let end = start + len + 1;
                parts.push(css_string(&rest[..end]));
                rest = &rest[end..];
                continue;
            }
        };
        if start > 0 {
            parts.push(css_string(&rest[..start]));
        }
        parts.push(counter.to_string());
        rest = &rest[start + len + 1..];
    }
    if !rest.is_empty() || parts.is_empty() {
        parts.push(css_string(rest));
    }
    parts.join(" ")
}
