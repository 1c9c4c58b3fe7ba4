use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Deserialize)]
struct RomajiConfig {
    spellings: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[spellings] table is empty")]
    Empty,
    #[error("no spellings listed for kana: {0}")]
    NoSpellings(String),
    #[error("empty spelling for kana: {0}")]
    EmptySpelling(String),
    #[error("non-ASCII spelling for kana {kana}: {spelling}")]
    NonAsciiSpelling { kana: String, spelling: String },
    #[error("romanization table already initialized")]
    AlreadyInitialized,
}

/// Parse TOML text into a sorted `BTreeMap<kana, spellings>`.
pub fn parse_romaji_toml(
    toml_str: &str,
) -> Result<BTreeMap<String, Vec<String>>, RomajiConfigError> {
    let config: RomajiConfig =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;

    if config.spellings.is_empty() {
        return Err(RomajiConfigError::Empty);
    }

    for (kana, spellings) in &config.spellings {
        if spellings.is_empty() {
            return Err(RomajiConfigError::NoSpellings(kana.clone()));
        }
        for spelling in spellings {
            if spelling.is_empty() {
                return Err(RomajiConfigError::EmptySpelling(kana.clone()));
            }
            if !spelling.is_ascii() {
                return Err(RomajiConfigError::NonAsciiSpelling {
                    kana: kana.clone(),
                    spelling: spelling.clone(),
                });
            }
        }
    }

    Ok(config.spellings)
}
