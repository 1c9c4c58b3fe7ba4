use crate::unicode::is_romaji_vowel;

/// Constraint a preceding unit places on how the next unit may be spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Lead {
    Any,
    /// Previous unit was a doubled consonant: spelling must start with it.
    Exactly(char),
    /// Previous unit was ん spelled as a lone `n`: the spelling must not
    /// start with `n`, which would re-read it as part of the next syllable.
    AfterSingleN,
}

impl Lead {
    pub(crate) fn admits(self, spelling: &str) -> bool {
        let Some(first) = spelling.chars().next() else {
            return true;
        };
        match self {
            Lead::Any => true,
            Lead::Exactly(c) => first == c,
            Lead::AfterSingleN => first != 'n',
        }
    }
}

/// Consonants that may double to spell っ before a unit with `spellings`,
/// in first-seen order.
///
/// Only syllable spellings (a consonant followed somewhere by a vowel)
/// count, so ん (`nn`, `xn`) never takes a doubled lead.
pub(crate) fn doubling_consonants(spellings: &[String]) -> Vec<char> {
    let mut out = Vec::new();
    for s in spellings {
        let mut chars = s.chars();
        let Some(c) = chars.next() else { continue };
        let syllable = chars.any(is_romaji_vowel);
        if c.is_ascii_alphabetic() && !is_romaji_vowel(c) && syllable && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits() {
        assert!(Lead::Any.admits("a"));
        assert!(Lead::Exactly('k').admits("ka"));
        assert!(!Lead::Exactly('k').admits("ca"));
        assert!(Lead::AfterSingleN.admits("ka"));
        assert!(Lead::AfterSingleN.admits(","));
        assert!(Lead::AfterSingleN.admits("a"));
        assert!(Lead::AfterSingleN.admits("ya"));
        assert!(!Lead::AfterSingleN.admits("na"));
        assert!(!Lead::AfterSingleN.admits("nya"));
    }

    #[test]
    fn test_doubling_consonants() {
        let sp = vec!["ka".to_string(), "ca".to_string(), "kya".to_string()];
        assert_eq!(doubling_consonants(&sp), vec!['k', 'c']);
        let vowel = vec!["a".to_string()];
        assert!(doubling_consonants(&vowel).is_empty());
        let nasal = vec!["nn".to_string(), "xn".to_string()];
        assert!(doubling_consonants(&nasal).is_empty());
        let na = vec!["na".to_string()];
        assert_eq!(doubling_consonants(&na), vec!['n']);
        let punct = vec![",".to_string()];
        assert!(doubling_consonants(&punct).is_empty());
    }
}
