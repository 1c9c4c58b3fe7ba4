use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use super::config::{parse_romaji_toml, RomajiConfigError};
use crate::unicode::is_small_kana;

pub const DEFAULT_TOML: &str = include_str!("default_romaji.toml");

/// Doubling-consonant unit.
pub const SOKUON: &str = "っ";
/// Nasal unit.
pub const HATSUON: &str = "ん";

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// One row of the table, borrowed from a [`RomajiTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomanizationEntry<'a> {
    pub kana: &'a str,
    /// Never empty; the first element is canonical.
    pub spellings: &'a [String],
}

#[derive(Debug, Clone)]
pub struct RomajiTable {
    entries: HashMap<String, Vec<String>>,
    /// Longest kana unit, in chars.
    max_unit_chars: usize,
}

impl RomajiTable {
    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), RomajiConfigError> {
        parse_romaji_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| RomajiConfigError::AlreadyInitialized)
    }

    /// Get or initialize the global table.
    pub fn global() -> &'static RomajiTable {
        static INSTANCE: OnceLock<RomajiTable> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_TOML);
            RomajiTable::from_toml(toml_str).expect("romanization TOML must be valid")
        })
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, RomajiConfigError> {
        parse_romaji_toml(toml_str).map(Self::from_map)
    }

    /// Build from a validated map, deriving composite spellings for digraphs.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut entries: HashMap<String, Vec<String>> = map.clone().into_iter().collect();

        for (kana, listed) in &map {
            let mut chars = kana.chars();
            let (Some(base), Some(small), None) = (chars.next(), chars.next(), chars.next())
            else {
                continue;
            };
            if !is_small_kana(small) {
                continue;
            }
            let (Some(base_sp), Some(small_sp)) = (
                map.get(base.to_string().as_str()),
                map.get(small.to_string().as_str()),
            ) else {
                continue;
            };

            let mut spellings = listed.clone();
            for b in base_sp {
                for s in small_sp {
                    let composite = format!("{b}{s}");
                    if !spellings.contains(&composite) {
                        spellings.push(composite);
                    }
                }
            }
            entries.insert(kana.clone(), spellings);
        }

        let max_unit_chars = entries
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(1);

        Self {
            entries,
            max_unit_chars,
        }
    }

    /// Accepted spellings for a kana unit, canonical first. Empty when the
    /// unit is unknown; callers treat such units as literal characters.
    pub fn spellings_for(&self, kana: &str) -> &[String] {
        self.entries.get(kana).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry(&self, kana: &str) -> Option<RomanizationEntry<'_>> {
        self.entries
            .get_key_value(kana)
            .map(|(kana, spellings)| RomanizationEntry { kana, spellings })
    }

    pub fn contains(&self, kana: &str) -> bool {
        self.entries.contains_key(kana)
    }

    pub fn canonical(&self, kana: &str) -> Option<&str> {
        self.spellings_for(kana).first().map(String::as_str)
    }

    pub fn max_unit_chars(&self) -> usize {
        self.max_unit_chars
    }

    /// All entries, sorted by kana for stable iteration.
    pub fn entries(&self) -> Vec<RomanizationEntry<'_>> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|(kana, spellings)| RomanizationEntry { kana, spellings })
            .collect();
        all.sort_by(|a, b| a.kana.cmp(b.kana));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
