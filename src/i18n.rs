//! Localized UI strings for the rendered sheet.
//!
//! The renderer asks a [`Localizer`] for each label; anything missing falls
//! back to the default locale and finally to the built-in English table.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};

/// Locale used when a string is missing from the requested one.
pub const DEFAULT_LOCALE: &str = "en";

/// Built-in English strings. `{name}` placeholders are filled by the renderer.
pub const ENGLISH: &[(&str, &str)] = &[
    ("untitled", "Untitled"),
    ("author", "Author"),
    ("transcribed_by", "Transcribed by"),
    ("notes", "Notes: {notes_count} | Duration: {duration}"),
    ("duration", "{minutes} min {seconds} sec"),
    ("legend", "Keys shown in the same box must be pressed simultaneously"),
    ("layout", "Keyboard layout: {layout}"),
    ("start", "START"),
    ("end", "END"),
    ("page", "Page {page} of {pages}"),
    ("empty", "This sheet contains no notes."),
    ("footer", "Generated by skysheet {version}"),
];

/// Source of translated strings.
pub trait Localizer {
    /// The string for `key` in `locale`, if that locale defines it.
    fn get_string(&self, locale: &str, key: &str) -> Option<&str>;
}

/// In-memory string tables keyed by locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: &str, key: &str, value: &str) {
        self.tables
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Add one locale from an XML file body: `<lang><key>text</key>..</lang>`.
    pub fn add_xml(&mut self, locale: &str, xml: &str) -> Result<()> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| ConvertError::Config(format!("translation '{locale}': {e}")))?;
        let table = self.tables.entry(locale.to_string()).or_default();
        for child in doc.root_element().children().filter(|n| n.is_element()) {
            let text = child.text().unwrap_or("").trim();
            if !text.is_empty() {
                table.insert(child.tag_name().name().to_string(), text.to_string());
            }
        }
        Ok(())
    }

    /// Load every `<locale>.xml` in `dir`. Unreadable files are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut translations = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        paths.sort();

        for path in paths {
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| ConvertError::io(&path, e))
                .and_then(|xml| translations.add_xml(locale, &xml));
            if let Err(e) = loaded {
                warn!(path = %path.display(), error = %e, "skipping translation file");
            }
        }
        debug!(locales = translations.tables.len(), "translations loaded");
        Ok(translations)
    }
}

impl Localizer for Translations {
    fn get_string(&self, locale: &str, key: &str) -> Option<&str> {
        self.tables.get(locale)?.get(key).map(String::as_str)
    }
}

/// Lookups for one locale with fallback down to the built-in table.
pub struct Strings<'a> {
    provider: &'a dyn Localizer,
    locale: &'a str,
}

impl<'a> Strings<'a> {
    pub fn new(provider: &'a dyn Localizer, locale: &'a str) -> Self {
        Self { provider, locale }
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    /// Requested locale, then its language (`fr` for `fr-CA`), then
    /// [`DEFAULT_LOCALE`], then English. Unknown keys echo the key.
    pub fn get(&self, key: &'a str) -> &'a str {
        let language = self.locale.split(['-', '_']).next().unwrap_or(self.locale);
        [self.locale, language, DEFAULT_LOCALE]
            .into_iter()
            .find_map(|locale| self.provider.get_string(locale, key))
            .or_else(|| ENGLISH.iter().find(|(k, _)| *k == key).map(|(_, v)| *v))
            .unwrap_or(key)
    }

    /// [`get`](Self::get) with `{name}` placeholders replaced.
    pub fn format(&self, key: &'a str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.get(key).to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}
