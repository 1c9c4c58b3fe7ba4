//! Practice phrase corpus and issue drawing.

use std::sync::OnceLock;

use rand::Rng;
use serde::Deserialize;

use crate::phrase::Phrase;
use crate::romaji::RomajiTable;
use crate::settings::ModeSettings;

pub const DEFAULT_CORPUS_TOML: &str = include_str!("default_corpus.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("corpus has no phrases")]
    Empty,
    #[error("phrase {index} is not kana: {phrase:?}")]
    NotKana { index: usize, phrase: String },
    #[error("corpus already initialized")]
    AlreadyInitialized,
}

#[derive(Deserialize)]
struct CorpusConfig {
    phrases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Corpus {
    phrases: Vec<String>,
}

impl Corpus {
    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), CorpusError> {
        parse_corpus_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| CorpusError::AlreadyInitialized)
    }

    /// Get or initialize the global corpus.
    pub fn global() -> &'static Corpus {
        static INSTANCE: OnceLock<Corpus> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_CORPUS_TOML);
            parse_corpus_toml(toml_str).expect("corpus TOML must be valid")
        })
    }

    pub fn new(phrases: Vec<String>) -> Result<Self, CorpusError> {
        if phrases.is_empty() {
            return Err(CorpusError::Empty);
        }
        for (index, phrase) in phrases.iter().enumerate() {
            if !is_practice_text(phrase) {
                return Err(CorpusError::NotKana {
                    index,
                    phrase: phrase.clone(),
                });
            }
        }
        Ok(Self { phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Pick `mode.issues` phrases at random, cut to `mode.units_per_issue`
    /// units when the mode asks for it.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        mode: &ModeSettings,
        table: &RomajiTable,
        rng: &mut R,
    ) -> Vec<Phrase> {
        (0..mode.issues)
            .map(|_| {
                let text = &self.phrases[rng.gen_range(0..self.phrases.len())];
                let phrase = Phrase::parse(text, table);
                match mode.units_per_issue {
                    Some(n) if phrase.len() > n => {
                        let start = rng.gen_range(0..=phrase.len() - n);
                        phrase.window(start, n)
                    }
                    _ => phrase,
                }
            })
            .collect()
    }
}

/// Kana text plus the full-width marks the romanization table spells.
fn is_practice_text(s: &str) -> bool {
    let kana_only: String = s
        .chars()
        .filter(|c| !matches!(c, '！' | '？' | '〜' | '\u{3000}'))
        .collect();
    crate::unicode::is_kana_phrase(&kana_only)
}

pub fn parse_corpus_toml(toml_str: &str) -> Result<Corpus, CorpusError> {
    let config: CorpusConfig =
        toml::from_str(toml_str).map_err(|e| CorpusError::Parse(e.to_string()))?;
    Corpus::new(config.phrases)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::predict::canonical_spelling;

    fn mode(issues: usize, units_per_issue: Option<usize>) -> ModeSettings {
        ModeSettings {
            issues,
            units_per_issue,
            ..ModeSettings::default()
        }
    }

    #[test]
    fn parse_default_corpus() {
        let corpus = parse_corpus_toml(DEFAULT_CORPUS_TOML).unwrap();
        assert!(corpus.len() > 40);
        assert!(corpus.phrases().iter().any(|p| p == "とうきょう"));
    }

    #[test]
    fn every_default_phrase_is_typeable() {
        let table = RomajiTable::global();
        for text in Corpus::global().phrases() {
            let phrase = Phrase::parse(text, table);
            let spelling = canonical_spelling(table, &phrase);
            assert!(spelling.is_ascii(), "{text} -> {spelling}");
        }
    }

    #[test]
    fn draw_issue_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let issues = Corpus::global().draw(&mode(12, None), RomajiTable::global(), &mut rng);
        assert_eq!(issues.len(), 12);
        assert!(issues.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn draw_is_reproducible() {
        let table = RomajiTable::global();
        let a = Corpus::global().draw(&mode(5, None), table, &mut SmallRng::seed_from_u64(42));
        let b = Corpus::global().draw(&mode(5, None), table, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn draw_windows_units() {
        let corpus = Corpus::new(vec!["ゆうびんきょく".to_string()]).unwrap();
        let table = RomajiTable::global();
        let mut rng = SmallRng::seed_from_u64(1);
        for phrase in corpus.draw(&mode(20, Some(3)), table, &mut rng) {
            assert_eq!(phrase.len(), 3);
            assert!("ゆうびんきょく".contains(&phrase.text()));
        }
    }

    #[test]
    fn draw_short_phrase_kept_whole() {
        let corpus = Corpus::new(vec!["すし".to_string()]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let issues = corpus.draw(&mode(2, Some(5)), RomajiTable::global(), &mut rng);
        assert_eq!(issues[0].units(), ["す", "し"]);
    }

    #[test]
    fn error_empty_corpus() {
        let err = parse_corpus_toml("phrases = []").unwrap_err();
        assert!(matches!(err, CorpusError::Empty));
    }

    #[test]
    fn error_non_kana_phrase() {
        let err = parse_corpus_toml(r#"phrases = ["すし", "Sushi"]"#).unwrap_err();
        assert!(matches!(err, CorpusError::NotKana { index: 1, .. }));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_corpus_toml("phrases = ").unwrap_err();
        assert!(matches!(err, CorpusError::Parse(_)));
    }
}
