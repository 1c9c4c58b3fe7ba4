/// Character-level classification for kana phrases and romaji keys.

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Small kana that combine with the preceding kana into a yōon digraph.
pub fn is_small_kana(c: char) -> bool {
    matches!(
        c,
        'ぁ' | 'ぃ' | 'ぅ' | 'ぇ' | 'ぉ' | 'ゃ' | 'ゅ' | 'ょ' | 'ゎ'
    )
}

/// Fold a katakana character onto its hiragana counterpart.
///
/// Characters outside the convertible katakana block (including the
/// prolonged sound mark ー) are returned unchanged.
pub fn to_hiragana(c: char) -> char {
    match c {
        '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    }
}

pub fn is_romaji_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

/// Check if a string is a valid practice phrase: hiragana plus the
/// prolonged sound mark and Japanese punctuation.
pub fn is_kana_phrase(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| is_hiragana(c) || matches!(c, 'ー' | '、' | '。' | '・' | '「' | '」'))
}
