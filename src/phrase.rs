//! Target phrases as sequences of kana units.

use std::fmt;

use crate::romaji::RomajiTable;
use crate::unicode::to_hiragana;

/// An ordered sequence of kana units, immutable once an issue begins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phrase {
    units: Vec<String>,
}

impl Phrase {
    /// Segment `text` into units by greedy longest match against the table.
    ///
    /// Katakana is folded to hiragana first. Characters the table does not
    /// know become single-character literal units.
    pub fn parse(text: &str, table: &RomajiTable) -> Self {
        let chars: Vec<char> = text.chars().map(to_hiragana).collect();
        let max = table.max_unit_chars().max(1);
        let mut units = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = max.min(chars.len() - i);
            let mut len = 1;
            for n in (2..=longest).rev() {
                let candidate: String = chars[i..i + n].iter().collect();
                if table.contains(&candidate) {
                    len = n;
                    break;
                }
            }
            units.push(chars[i..i + len].iter().collect());
            i += len;
        }

        Self { units }
    }

    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
        }
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Contiguous sub-phrase of up to `len` units starting at `start`.
    pub fn window(&self, start: usize, len: usize) -> Phrase {
        let start = start.min(self.units.len());
        let end = (start + len).min(self.units.len());
        Phrase {
            units: self.units[start..end].to_vec(),
        }
    }

    pub fn text(&self) -> String {
        self.units.concat()
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            f.write_str(unit)?;
        }
        Ok(())
    }
}
