use std::collections::HashMap;

use tracing::warn;

use super::lead::{doubling_consonants, Lead};
use super::preference::SpellingPreference;
use super::PredictOptions;
use crate::phrase::Phrase;
use crate::romaji::{RomajiTable, HATSUON, SOKUON};

const PENALTY_WEIGHT: u64 = 10_000;

/// The resolver's pick: the full string plus the spelling chosen per unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub text: String,
    pub spellings: Vec<String>,
}

impl Guess {
    /// Number of leading units fully covered by `typed_len` characters.
    pub fn units_covered(&self, typed_len: usize) -> usize {
        let mut total = 0;
        let mut covered = 0;
        for spelling in &self.spellings {
            total += spelling.len();
            if total > typed_len {
                break;
            }
            covered += 1;
        }
        covered
    }

    /// Character of the hint at `index`, if the hint is that long.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index..).and_then(|s| s.chars().next())
    }
}

/// Best full romanization of `phrase` consistent with `typed`.
pub fn best_guess(
    table: &RomajiTable,
    preference: &SpellingPreference,
    phrase: &Phrase,
    typed: &str,
) -> String {
    resolve(table, preference, phrase, typed).text
}

pub fn resolve(
    table: &RomajiTable,
    preference: &SpellingPreference,
    phrase: &Phrase,
    typed: &str,
) -> Guess {
    resolve_with(table, preference, phrase, typed, PredictOptions::default())
}

/// Memoized depth-first search over every spelling consistent with `typed`.
///
/// A candidate scores `penalty * 10000 + (len - typed.len())`, where each
/// unit not spelled with its preferred spelling adds one penalty point. The
/// lowest score wins; ties keep the first candidate in search order.
pub fn resolve_with(
    table: &RomajiTable,
    preference: &SpellingPreference,
    phrase: &Phrase,
    typed: &str,
    options: PredictOptions,
) -> Guess {
    let mut search = Search {
        table,
        preference,
        units: phrase.units(),
        typed,
        options,
        memo: HashMap::new(),
    };

    match search.best(0, 0, Lead::Any) {
        Some(best) => Guess {
            text: best.spellings.concat(),
            spellings: best.spellings,
        },
        None => {
            warn!(phrase = %phrase, typed, "no spelling consistent with input; using canonical");
            canonical_guess(table, phrase, options)
        }
    }
}

/// Canonical romanization: no preferences, nothing typed.
pub fn canonical_spelling(table: &RomajiTable, phrase: &Phrase) -> String {
    canonical_guess(table, phrase, PredictOptions::default()).text
}

fn canonical_guess(table: &RomajiTable, phrase: &Phrase, options: PredictOptions) -> Guess {
    let empty = SpellingPreference::new();
    let mut search = Search {
        table,
        preference: &empty,
        units: phrase.units(),
        typed: "",
        options,
        memo: HashMap::new(),
    };
    if let Some(best) = search.best(0, 0, Lead::Any) {
        return Guess {
            text: best.spellings.concat(),
            spellings: best.spellings,
        };
    }

    // First-listed spelling per unit, context ignored.
    let spellings: Vec<String> = phrase
        .units()
        .iter()
        .map(|unit| {
            table
                .canonical(unit)
                .map(str::to_string)
                .unwrap_or_else(|| unit.clone())
        })
        .collect();
    Guess {
        text: spellings.concat(),
        spellings,
    }
}

#[derive(Debug, Clone)]
struct Scored {
    score: u64,
    spellings: Vec<String>,
}

struct Choice {
    spelling: String,
    penalty: u64,
    next_lead: Lead,
}

struct Search<'a> {
    table: &'a RomajiTable,
    preference: &'a SpellingPreference,
    units: &'a [String],
    typed: &'a str,
    options: PredictOptions,
    memo: HashMap<(usize, usize, Lead), Option<Scored>>,
}

impl Search<'_> {
    fn best(&mut self, index: usize, pos: usize, lead: Lead) -> Option<Scored> {
        if let Some(hit) = self.memo.get(&(index, pos, lead)) {
            return hit.clone();
        }
        let result = self.best_uncached(index, pos, lead);
        self.memo.insert((index, pos, lead), result.clone());
        result
    }

    fn best_uncached(&mut self, index: usize, pos: usize, lead: Lead) -> Option<Scored> {
        if index == self.units.len() {
            return Some(Scored {
                score: 0,
                spellings: Vec::new(),
            });
        }

        let typed = self.typed;
        let rest = &typed[pos..];
        let mut best: Option<Scored> = None;

        for choice in self.choices(index, lead) {
            let next_pos = if rest.starts_with(choice.spelling.as_str()) {
                pos + choice.spelling.len()
            } else if choice.spelling.starts_with(rest) {
                typed.len()
            } else {
                continue;
            };

            let Some(tail) = self.best(index + 1, next_pos, choice.next_lead) else {
                continue;
            };
            let score =
                choice.penalty * PENALTY_WEIGHT + choice.spelling.len() as u64 + tail.score;
            if best.as_ref().is_some_and(|b| b.score <= score) {
                continue;
            }
            let mut spellings = Vec::with_capacity(tail.spellings.len() + 1);
            spellings.push(choice.spelling);
            spellings.extend(tail.spellings);
            best = Some(Scored { score, spellings });
        }

        best
    }

    /// Spellings available to unit `index`, preferred first.
    fn choices(&self, index: usize, lead: Lead) -> Vec<Choice> {
        let unit = self.units[index].as_str();
        let spellings = self.table.spellings_for(unit);

        if spellings.is_empty() {
            return if lead.admits(unit) {
                vec![Choice {
                    spelling: unit.to_string(),
                    penalty: 0,
                    next_lead: Lead::Any,
                }]
            } else {
                Vec::new()
            };
        }

        let is_last = index + 1 == self.units.len();
        let pref = self.preference.get(unit);

        // (spelling, next lead, belongs to the preferred class)
        let mut options: Vec<(String, Lead, bool)> = Vec::new();

        if unit == SOKUON && !is_last {
            let next = self.table.spellings_for(&self.units[index + 1]);
            // Doubling is the default; a single-consonant preference means
            // the player doubled last time.
            let doubling_preferred = pref.map_or(true, |p| p.chars().count() == 1);
            for c in doubling_consonants(next) {
                options.push((c.to_string(), Lead::Exactly(c), doubling_preferred));
            }
            let has_doubling = !options.is_empty();
            for (i, s) in spellings.iter().enumerate() {
                let preferred = match pref {
                    Some(p) if p.chars().count() > 1 => p == s,
                    _ => !has_doubling && i == 0,
                };
                options.push((s.clone(), Lead::Any, preferred));
            }
        } else {
            let mut listed: Vec<String> = spellings.to_vec();
            if unit == HATSUON && (!is_last || self.options.single_n_at_end) {
                listed.push("n".to_string());
            }
            let single_n_lead = if is_last {
                Lead::Any
            } else {
                Lead::AfterSingleN
            };
            let preferred = pref
                .filter(|p| listed.iter().any(|s| s == p))
                .unwrap_or(spellings[0].as_str())
                .to_string();
            for s in listed {
                let next_lead = if unit == HATSUON && s == "n" {
                    single_n_lead
                } else {
                    Lead::Any
                };
                let is_preferred = s == preferred;
                options.push((s, next_lead, is_preferred));
            }
        }

        let (mut preferred, others): (Vec<_>, Vec<_>) =
            options.into_iter().partition(|(_, _, p)| *p);
        preferred.extend(others);

        preferred
            .into_iter()
            .filter(|(s, _, _)| lead.admits(s))
            .map(|(spelling, next_lead, is_preferred)| Choice {
                spelling,
                penalty: u64::from(!is_preferred),
                next_lead,
            })
            .collect()
    }
}
