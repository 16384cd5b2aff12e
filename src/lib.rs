//! skysheet: SkySheet parser and printable HTML key-sheet renderer.
//!
//! Reads a SkySheet song (JSON export or plain-text chord lines), maps every
//! instrument key to a keyboard glyph and writes a self-contained HTML page
//! that paginates the chords for screen and print.
//!
//! # Example
//! ```no_run
//! use skysheet::{convert, BuiltinLayout, LayoutSelector};
//!
//! let html = convert(
//!     "path/to/song.skysheet".as_ref(),
//!     &LayoutSelector::Builtin(BuiltinLayout::Qwerty),
//!     "en",
//! ).unwrap();
//! println!("{} bytes", html.len());
//! ```

pub mod detect;
pub mod error;
pub mod i18n;
pub mod layout;
pub mod model;
pub mod paginate;
pub mod parser;
pub mod renderer;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

pub use error::{ConvertError, Result, SourcePosition, TimingProblem};
pub use i18n::{Localizer, Strings, Translations, DEFAULT_LOCALE};
pub use layout::{suggested_layout, BuiltinLayout, LayoutMap, LayoutSelector};
pub use model::*;
pub use paginate::{Page, PaginationConfig, Paginator, Row, Slot};
pub use parser::{parse_bytes, parse_str, ParseOptions};
pub use renderer::{render_html, ChordStyle, RenderOptions, SheetHeader};

/// All tunables of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub pagination: PaginationConfig,
    pub render: RenderOptions,
}

impl ConvertOptions {
    pub fn validate(&self) -> Result<()> {
        self.parse.validate()?;
        self.pagination.validate()
    }
}

/// A configured pipeline: detect → parse → layout → paginate → render.
///
/// Holds no per-run state, so one converter can serve many files.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    paginator: Paginator,
    translations: Translations,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            options: ConvertOptions::default(),
            paginator: Paginator::default(),
            translations: Translations::new(),
        }
    }
}

impl Converter {
    /// Build a converter, rejecting invalid options up front.
    pub fn new(options: ConvertOptions, translations: Translations) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            paginator: Paginator::new(options.pagination)?,
            options,
            translations,
        })
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the sheet at `input` into an HTML string.
    ///
    /// The file stem titles songs that carry no name of their own.
    pub fn convert(&self, input: &Path, layout: &LayoutSelector, locale: &str) -> Result<String> {
        let data = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;
        let extension = input.extension().and_then(|e| e.to_str());
        let stem = input.file_stem().and_then(|s| s.to_str());
        self.convert_bytes(&data, extension, stem, layout, locale)
    }

    /// Convert in-memory sheet bytes.
    pub fn convert_bytes(
        &self,
        data: &[u8],
        extension: Option<&str>,
        fallback_title: Option<&str>,
        layout: &LayoutSelector,
        locale: &str,
    ) -> Result<String> {
        let song = parse_bytes(data, extension, &self.options.parse)?;
        let layout = layout.resolve()?;
        debug!(layout = layout.name(), "layout resolved");

        let pages = self.paginator.paginate(&song, &layout);
        let header = SheetHeader::for_song(&song, fallback_title);
        let strings = Strings::new(&self.translations, locale);
        Ok(render_html(&pages, &layout, &header, &strings, &self.options.render))
    }

    /// Convert `input` and write the result beside it as `<stem>.html`.
    ///
    /// Nothing is written unless the whole conversion succeeds.
    pub fn convert_to_file(&self, input: &Path, layout: &LayoutSelector, locale: &str) -> Result<PathBuf> {
        let html = self.convert(input, layout, locale)?;
        let output = output_path_for(input);
        std::fs::write(&output, html).map_err(|e| ConvertError::io(&output, e))?;
        info!(input = %input.display(), output = %output.display(), "sheet converted");
        Ok(output)
    }
}

/// Convert with default options and the built-in English strings.
pub fn convert(input: &Path, layout: &LayoutSelector, locale: &str) -> Result<String> {
    Converter::default().convert(input, layout, locale)
}

/// Where the HTML for `input` goes: same directory and stem, `.html`.
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_options_fail_at_construction() {
        let options = ConvertOptions {
            pagination: PaginationConfig {
                rows_per_page: 0,
                ..PaginationConfig::default()
            },
            ..ConvertOptions::default()
        };
        let err = Converter::new(options, Translations::new()).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn output_sits_beside_input() {
        assert_eq!(
            output_path_for(Path::new("songs/ode.skysheet")),
            PathBuf::from("songs/ode.html")
        );
        assert_eq!(output_path_for(Path::new("ode.json")), PathBuf::from("ode.html"));
    }

    #[test]
    fn unknown_key_fails_before_layout_is_loaded() {
        // The custom layout file does not exist; the key error must win.
        let layout = LayoutSelector::CustomFile(PathBuf::from("/nonexistent/custom.xml"));
        let err = Converter::default()
            .convert_bytes(b"Key1 Key99\n", Some("txt"), None, &layout, "en")
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownKey { ref token, .. } if token == "Key99"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ConvertOptions = serde_json::from_str(
            r#"{"pagination": {"row_capacity": 8}, "render": {"chord_style": "keyboard"}}"#,
        )
        .unwrap();
        assert_eq!(options.pagination.row_capacity, 8);
        assert_eq!(options.pagination.rows_per_page, paginate::DEFAULT_ROWS_PER_PAGE);
        assert_eq!(options.render.chord_style, ChordStyle::Keyboard);
        assert!(options.render.show_arrows);
        assert_eq!(options.parse, ParseOptions::default());
    }
}
