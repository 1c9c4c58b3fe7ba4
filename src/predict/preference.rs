use std::collections::HashMap;

/// Per-kana memory of the player's last completed spelling.
///
/// Entries are only ever overwritten, never removed; a fresh value is
/// created for every practice session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellingPreference {
    map: HashMap<String, String>,
}

impl SpellingPreference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kana: &str) -> Option<&str> {
        self.map.get(kana).map(String::as_str)
    }

    pub fn record(&mut self, kana: &str, spelling: &str) {
        if self.get(kana) != Some(spelling) {
            self.map.insert(kana.to_string(), spelling.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
