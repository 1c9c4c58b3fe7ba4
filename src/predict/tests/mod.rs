
use crate::phrase::Phrase;
use crate::romaji::RomajiTable;

use super::{next_keys_with, PredictOptions};

pub(super) fn table() -> &'static RomajiTable {
    RomajiTable::global()
}

pub(super) fn phrase(units: &[&str]) -> Phrase {
    Phrase::from_units(units.iter().copied())
}

pub(super) fn letters(p: &Phrase, typed: &str) -> Vec<char> {
    let mut out = super::next_keys(table(), p, typed).letters();
    out.sort_unstable();
    out
}

/// Feed `input` one character at a time. Every proper prefix must offer the
/// next character and the full input must leave no candidates.
pub(super) fn accepts_with(p: &Phrase, input: &str, options: PredictOptions) -> bool {
    let mut typed = String::new();
    for c in input.chars() {
        let keys = next_keys_with(table(), p, &typed, options);
        if keys.is_empty() || !keys.contains(c) {
            return false;
        }
        typed.push(c);
    }
    next_keys_with(table(), p, &typed, options).is_empty()
}

pub(super) fn accepts(p: &Phrase, input: &str) -> bool {
    accepts_with(p, input, PredictOptions::default())
}
