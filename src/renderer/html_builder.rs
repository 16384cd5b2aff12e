//! HTML builder: accumulates indented markup and produces the final string.

pub(super) struct HtmlBuilder {
    out: String,
    depth: usize,
}

impl HtmlBuilder {
    pub(super) fn new() -> Self {
        Self {
            out: String::with_capacity(16 * 1024),
            depth: 0,
        }
    }

    pub(super) fn build(self) -> String {
        self.out
    }

    /// One indented line of trusted markup.
    pub(super) fn line(&mut self, markup: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(markup);
        self.out.push('\n');
    }

    /// A block of trusted text (stylesheet), emitted line by line.
    pub(super) fn raw_block(&mut self, block: &str) {
        for l in block.lines() {
            if l.trim().is_empty() {
                continue;
            }
            self.line(l);
        }
    }

    pub(super) fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        let markup = format!("<{tag}{}>", attributes(attrs));
        self.line(&markup);
        self.depth += 1;
    }

    pub(super) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    /// `<tag attrs>text</tag>` on one line, text escaped.
    pub(super) fn element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        let markup = format!("<{tag}{}>{}</{tag}>", attributes(attrs), escape_text(text));
        self.line(&markup);
    }
}

fn attributes(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {name}=\"{}\"", escape_attr(value)))
        .collect()
}

pub(super) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(super) fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Quote a value for a CSS string literal (`content: "..."`).
///
/// `<` is hex-escaped so the value can never close the `<style>` element.
pub(super) fn css_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '<' => quoted.push_str("\\3C "),
            '\n' | '\r' => quoted.push_str("\\A "),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
