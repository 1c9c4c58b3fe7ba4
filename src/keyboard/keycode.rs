//! Hardware key codes and the JIS base/shift tables.
//!
//! Codes follow the W3C `KeyboardEvent.code` names (`KeyA`, `Digit1`,
//! `IntlRo`, ...), which identify the physical key regardless of the OS
//! layout.

use serde::{Deserialize, Serialize};

/// Index reported for keys that have no position in the layout grid.
pub const UNKNOWN_KEY_INDEX: usize = 255;

pub(crate) const INTL_RO: &str = "IntlRo";

/// One physical key press as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: String,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>, shift: bool) -> Self {
        Self {
            code: code.into(),
            shift,
        }
    }

    /// The event that types `ch` on the base JIS board.
    pub fn for_char(ch: char) -> Option<Self> {
        code_for_char(ch).map(|(code, shift)| Self { code, shift })
    }
}

const SYMBOL_KEYS: &[(&str, char)] = &[
    ("Minus", '-'),
    ("Equal", '^'),
    ("IntlYen", '\\'),
    ("BracketLeft", '@'),
    ("BracketRight", '['),
    ("Semicolon", ';'),
    ("Quote", ':'),
    ("Backslash", ']'),
    ("Comma", ','),
    ("Period", '.'),
    ("Slash", '/'),
    ("IntlRo", '\\'),
    ("Space", ' '),
];

const SHIFTED: &[(char, char)] = &[
    ('1', '!'),
    ('2', '"'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '&'),
    ('7', '\''),
    ('8', '('),
    ('9', ')'),
    ('-', '='),
    ('^', '~'),
    ('@', '`'),
    ('[', '{'),
    (';', '+'),
    (':', '*'),
    (']', '}'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('=', '+'),
    ('\'', '"'),
    ('`', '~'),
];

/// Layout-independent base character for a hardware code, or `None` for
/// keys that do not type anything (modifiers, function keys).
pub fn base_char(code: &str) -> Option<char> {
    if let Some(letter) = code.strip_prefix("Key") {
        let mut chars = letter.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Some(c.to_ascii_lowercase()),
            _ => None,
        };
    }
    if let Some(digit) = code.strip_prefix("Digit") {
        let mut chars = digit.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => None,
        };
    }
    SYMBOL_KEYS
        .iter()
        .find(|(name, _)| *name == code)
        .map(|&(_, c)| c)
}

/// Character produced by `ch` with shift held.
///
/// `\` lives on two JIS keys; the ro key shifts to `_`, the yen key to `|`.
pub fn shifted(ch: char, at_ro: bool) -> char {
    if ch == '\\' {
        return if at_ro { '_' } else { '|' };
    }
    if ch.is_ascii_lowercase() {
        return ch.to_ascii_uppercase();
    }
    SHIFTED
        .iter()
        .find(|(base, _)| *base == ch)
        .map_or(ch, |&(_, s)| s)
}

/// Hardware code and shift state that type `ch` on the base JIS board.
///
/// Reverse of [`base_char`] + [`shifted`], used to replay text as key events.
pub fn code_for_char(ch: char) -> Option<(String, bool)> {
    if ch.is_ascii_lowercase() {
        return Some((format!("Key{}", ch.to_ascii_uppercase()), false));
    }
    if ch.is_ascii_uppercase() {
        return Some((format!("Key{ch}"), true));
    }
    if ch.is_ascii_digit() {
        return Some((format!("Digit{ch}"), false));
    }
    match ch {
        '_' => return Some((INTL_RO.to_string(), true)),
        '|' => return Some(("IntlYen".to_string(), true)),
        _ => {}
    }
    if let Some(&(name, _)) = SYMBOL_KEYS.iter().find(|(_, c)| *c == ch) {
        return Some((name.to_string(), false));
    }
    let base = SHIFTED.iter().find(|(_, s)| *s == ch).map(|&(b, _)| b)?;
    if base.is_ascii_digit() {
        return Some((format!("Digit{base}"), true));
    }
    SYMBOL_KEYS
        .iter()
        .find(|(_, c)| *c == base)
        .map(|&(name, _)| (name.to_string(), true))
}
