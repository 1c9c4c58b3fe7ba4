//! Romanization table: kana unit → ordered list of accepted spellings.
//!
//! The table is loaded from TOML (embedded default or a custom file) and
//! covers sokuon (っ), hatsuon (ん) and yōon digraphs (きょ).

mod config;
mod table;

pub use config::{parse_romaji_toml, RomajiConfigError};
pub use table::{RomajiTable, RomanizationEntry, DEFAULT_TOML, HATSUON, SOKUON};
