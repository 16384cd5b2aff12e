//! Keyboard layouts: map each of the 15 instrument keys to a printable glyph.
//!
//! Built-in layouts are compiled-in tables, materialised once and shared.
//! A custom layout is read from XML (`<layout><key id="Key0">z</key>..`)
//! or a JSON object (`{"Key0": "z", ..}`) and must cover every key.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::model::{layout_key_names, KeyId, KEY_COUNT};

type GlyphTable = [&'static str; KEY_COUNT as usize];

const QWERTZ: GlyphTable = ["z", "u", "i", "o", "p", "h", "j", "k", "l", "ö", "n", "m", ",", ".", "-"];
const QWERTY: GlyphTable = ["y", "u", "i", "o", "p", "h", "j", "k", "l", ";", "n", "m", ",", ".", "/"];
const AZERTY: GlyphTable = ["y", "u", "i", "o", "p", "h", "j", "k", "l", "m", "b", "n", ",", ";", ":"];
const ARABIC: GlyphTable = ["ش", "س", "ي", "ب", "ل", "ا", "ت", "ن", "م", "ك", "ط", "ئ", "ء", "ض", "ظ"];
const JIS: GlyphTable = ["た", "て", "い", "す", "か", "ん", "な", "に", "ら", "せ", "ゆ", "も", "る", "け", "く"];
const RUSSIAN: GlyphTable = ["й", "ц", "у", "к", "е", "н", "г", "ш", "щ", "з", "ф", "ы", "в", "а", "п"];

/// Physical keyboard arrangements shipped with the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuiltinLayout {
    #[default]
    Qwertz,
    Qwerty,
    Azerty,
    Arabic,
    Jis,
    Russian,
}

impl BuiltinLayout {
    pub const ALL: [BuiltinLayout; 6] = [
        BuiltinLayout::Qwertz,
        BuiltinLayout::Qwerty,
        BuiltinLayout::Azerty,
        BuiltinLayout::Arabic,
        BuiltinLayout::Jis,
        BuiltinLayout::Russian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinLayout::Qwertz => "QWERTZ",
            BuiltinLayout::Qwerty => "QWERTY",
            BuiltinLayout::Azerty => "AZERTY",
            BuiltinLayout::Arabic => "ARABIC",
            BuiltinLayout::Jis => "JIS",
            BuiltinLayout::Russian => "RUSSIAN",
        }
    }

    fn table(self) -> &'static GlyphTable {
        match self {
            BuiltinLayout::Qwertz => &QWERTZ,
            BuiltinLayout::Qwerty => &QWERTY,
            BuiltinLayout::Azerty => &AZERTY,
            BuiltinLayout::Arabic => &ARABIC,
            BuiltinLayout::Jis => &JIS,
            BuiltinLayout::Russian => &RUSSIAN,
        }
    }

    /// The shared, immutable map for this layout.
    pub fn map(self) -> &'static LayoutMap {
        static MAPS: OnceLock<Vec<LayoutMap>> = OnceLock::new();
        let maps = MAPS.get_or_init(|| {
            BuiltinLayout::ALL
                .iter()
                .map(|layout| LayoutMap {
                    name: layout.name().to_string(),
                    glyphs: layout.table().iter().map(|g| g.to_string()).collect(),
                })
                .collect()
        });
        &maps[self as usize]
    }
}

impl fmt::Display for BuiltinLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinLayout {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        BuiltinLayout::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConvertError::Config(format!("unknown keyboard layout '{s}'")))
    }
}

/// Layout that fits the usual keyboard of a UI locale.
pub fn suggested_layout(locale: &str) -> BuiltinLayout {
    let lang = locale.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
    match lang.as_str() {
        "de" => BuiltinLayout::Qwertz,
        "fr" => BuiltinLayout::Azerty,
        "ru" => BuiltinLayout::Russian,
        "ar" => BuiltinLayout::Arabic,
        "ja" => BuiltinLayout::Jis,
        _ => BuiltinLayout::Qwerty,
    }
}

/// Which layout a conversion should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSelector {
    Builtin(BuiltinLayout),
    /// Custom definition read from a file
    CustomFile(PathBuf),
    /// Custom definition given inline
    CustomSource(String),
}

impl Default for LayoutSelector {
    fn default() -> Self {
        LayoutSelector::Builtin(BuiltinLayout::default())
    }
}

impl LayoutSelector {
    /// Load or look up the selected layout.
    pub fn resolve(&self) -> Result<Cow<'static, LayoutMap>> {
        match self {
            LayoutSelector::Builtin(layout) => Ok(Cow::Borrowed(layout.map())),
            LayoutSelector::CustomFile(path) => load_custom_layout(path).map(Cow::Owned),
            LayoutSelector::CustomSource(source) => LayoutMap::parse_custom(source).map(Cow::Owned),
        }
    }
}

/// Total mapping from every key index to a glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMap {
    name: String,
    glyphs: Vec<String>,
}

impl LayoutMap {
    /// Build a layout from `Key<n>` → glyph pairs.
    ///
    /// Every key of the universe needs a non-empty glyph, whatever song the
    /// layout is later used with.
    pub fn from_pairs<I, K, V>(name: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut glyphs: Vec<Option<String>> = vec![None; KEY_COUNT as usize];
        for (id, glyph) in pairs {
            let id = id.as_ref();
            let key = KeyId::parse(id)
                .ok_or_else(|| ConvertError::LayoutParse(format!("unknown key id '{id}'")))?;
            let slot = &mut glyphs[key.index() as usize];
            if slot.is_some() {
                warn!(id, "key defined twice in custom layout, keeping the last glyph");
            }
            *slot = Some(glyph.as_ref().trim().to_string()).filter(|g| !g.is_empty());
        }

        let missing: Vec<String> = glyphs
            .iter()
            .zip(layout_key_names())
            .filter(|(g, _)| g.is_none())
            .map(|(_, id)| id)
            .collect();
        if !missing.is_empty() {
            return Err(ConvertError::LayoutIncomplete { missing });
        }

        Ok(Self {
            name: name.to_string(),
            glyphs: glyphs.into_iter().flatten().collect(),
        })
    }

    /// Parse a custom definition, XML or JSON by its first character.
    pub fn parse_custom(source: &str) -> Result<Self> {
        let source = source.trim_start_matches('\u{feff}').trim();
        let pairs = if source.starts_with('<') {
            parse_xml_pairs(source)?
        } else if source.starts_with('{') {
            serde_json::from_str::<BTreeMap<String, String>>(source)
                .map_err(|e| ConvertError::LayoutParse(format!("invalid JSON layout: {e}")))?
                .into_iter()
                .collect()
        } else {
            return Err(ConvertError::LayoutParse(
                "expected an XML or JSON layout definition".into(),
            ));
        };
        let map = Self::from_pairs("CUSTOM", pairs)?;
        debug!("custom layout loaded");
        Ok(map)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glyph for a key. Groups share the same glyphs.
    pub fn glyph(&self, key: KeyId) -> &str {
        &self.glyphs[key.index() as usize]
    }

    /// Glyph for a raw grid index, if in range.
    pub fn glyph_at(&self, index: u8) -> Option<&str> {
        self.glyphs.get(index as usize).map(String::as_str)
    }
}

fn parse_xml_pairs(xml: &str) -> Result<Vec<(String, String)>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ConvertError::LayoutParse(format!("XML parse error: {e}")))?;

    let mut pairs = Vec::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        if node.tag_name().name() != "key" {
            continue;
        }
        let id = node.attribute("id").ok_or_else(|| {
            let pos = doc.text_pos_at(node.range().start);
            ConvertError::LayoutParse(format!("<key> without id attribute at {pos}"))
        })?;
        pairs.push((id.to_string(), node.text().unwrap_or("").to_string()));
    }
    Ok(pairs)
}

/// Read and validate a custom layout file.
pub fn load_custom_layout(path: &Path) -> Result<LayoutMap> {
    let source = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    LayoutMap::parse_custom(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_xml(skip: Option<u8>) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<layout>\n");
        for i in 0..KEY_COUNT {
            if Some(i) != skip {
                xml.push_str(&format!("  <key id=\"Key{i}\">{}</key>\n", (b'a' + i) as char));
            }
        }
        xml.push_str("</layout>\n");
        xml
    }

    #[test]
    fn every_builtin_layout_is_complete() {
        for layout in BuiltinLayout::ALL {
            let map = layout.map();
            assert_eq!(map.name(), layout.name());
            for i in 0..KEY_COUNT {
                let glyph = map.glyph_at(i).unwrap_or("");
                assert!(!glyph.is_empty(), "{layout} has no glyph for Key{i}");
            }
            for group in [0, 1, 2, u8::MAX] {
                for key in (0..=u8::MAX).filter_map(|i| KeyId::new(group, i)) {
                    assert_eq!(map.glyph(key), map.glyph_at(key.index()).unwrap_or(""));
                }
            }
        }
    }

    #[test]
    fn builtin_maps_are_shared() {
        assert!(std::ptr::eq(BuiltinLayout::Azerty.map(), BuiltinLayout::Azerty.map()));
        assert_eq!(BuiltinLayout::Qwertz.map().glyph(KeyId::new(3, 9).unwrap()), "ö");
    }

    #[test]
    fn layout_names_parse_case_insensitively() {
        assert_eq!("qwerty".parse::<BuiltinLayout>().unwrap(), BuiltinLayout::Qwerty);
        assert_eq!(" JIS ".parse::<BuiltinLayout>().unwrap(), BuiltinLayout::Jis);
        assert!(matches!("dvorak".parse::<BuiltinLayout>(), Err(ConvertError::Config(_))));
    }

    #[test]
    fn suggestions_follow_locale() {
        assert_eq!(suggested_layout("de"), BuiltinLayout::Qwertz);
        assert_eq!(suggested_layout("fr-CA"), BuiltinLayout::Azerty);
        assert_eq!(suggested_layout("ja_JP"), BuiltinLayout::Jis);
        assert_eq!(suggested_layout("es"), BuiltinLayout::Qwerty);
        assert_eq!(suggested_layout("pt"), BuiltinLayout::Qwerty);
    }

    #[test]
    fn custom_xml_layout() {
        let map = LayoutMap::parse_custom(&full_xml(None)).unwrap();
        assert_eq!(map.name(), "CUSTOM");
        assert_eq!(map.glyph(KeyId::new(1, 0).unwrap()), "a");
        assert_eq!(map.glyph(KeyId::new(2, 14).unwrap()), "o");
    }

    #[test]
    fn custom_json_layout() {
        let json = format!(
            "{{{}}}",
            layout_key_names()
                .map(|k| format!("\"{k}\": \"#{k}\""))
                .collect::<Vec<_>>()
                .join(",")
        );
        let map = LayoutMap::parse_custom(&json).unwrap();
        assert_eq!(map.glyph(KeyId::new(1, 7).unwrap()), "#Key7");
    }

    #[test]
    fn missing_key_is_named() {
        let err = LayoutMap::parse_custom(&full_xml(Some(11))).unwrap_err();
        match err {
            ConvertError::LayoutIncomplete { missing } => assert_eq!(missing, vec!["Key11"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_glyph_counts_as_missing() {
        let xml = full_xml(None).replace(">c<", ">  <");
        let err = LayoutMap::parse_custom(&xml).unwrap_err();
        assert!(matches!(err, ConvertError::LayoutIncomplete { ref missing } if missing == &["Key2"]));
    }

    #[test]
    fn malformed_definitions_are_parse_errors() {
        assert!(matches!(
            LayoutMap::parse_custom("<layout><key id=\"Key0\">a</layout>"),
            Err(ConvertError::LayoutParse(_))
        ));
        assert!(matches!(
            LayoutMap::parse_custom("<layout><key>a</key></layout>"),
            Err(ConvertError::LayoutParse(_))
        ));
        assert!(matches!(
            LayoutMap::parse_custom("<layout><key id=\"Key20\">a</key></layout>"),
            Err(ConvertError::LayoutParse(_))
        ));
        assert!(matches!(
            LayoutMap::parse_custom("Key0 = a"),
            Err(ConvertError::LayoutParse(_))
        ));
    }

    #[test]
    fn custom_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.xml");
        std::fs::write(&path, full_xml(None)).unwrap();
        let map = LayoutSelector::CustomFile(path).resolve().unwrap();
        assert_eq!(map.glyph(KeyId::new(1, 1).unwrap()), "b");

        let missing = LayoutSelector::CustomFile(dir.path().join("nope.xml")).resolve();
        assert!(matches!(missing, Err(ConvertError::Io { .. })));
    }
}
