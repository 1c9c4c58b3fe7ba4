use std::collections::HashMap;

use tracing::trace;

use super::lead::{doubling_consonants, Lead};
use super::PredictOptions;
use crate::phrase::Phrase;
use crate::romaji::{RomajiTable, HATSUON, SOKUON};

/// Where a candidate letter came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Literal character of the phrase (punctuation, digits, unknown kana).
    Direct,
    /// Character `offset` of an accepted `spelling` of `kana`.
    TableMatch {
        kana: String,
        spelling: String,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NextKeyCandidate {
    pub letter: char,
    pub provenance: Provenance,
}

impl NextKeyCandidate {
    pub fn source_kana(&self) -> Option<&str> {
        match &self.provenance {
            Provenance::TableMatch { kana, .. } => Some(kana),
            Provenance::Direct => None,
        }
    }

    pub fn source_spelling(&self) -> Option<&str> {
        match &self.provenance {
            Provenance::TableMatch { spelling, .. } => Some(spelling),
            Provenance::Direct => None,
        }
    }

    /// True when typing this letter finishes its source spelling.
    pub fn completes_spelling(&self) -> bool {
        match &self.provenance {
            Provenance::TableMatch {
                spelling, offset, ..
            } => offset + 1 == spelling.chars().count(),
            Provenance::Direct => true,
        }
    }
}

/// Set of legal next characters. Empty means the phrase is fully typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextKeys {
    candidates: Vec<NextKeyCandidate>,
}

impl NextKeys {
    fn from_candidates(raw: Vec<NextKeyCandidate>) -> Self {
        let mut candidates: Vec<NextKeyCandidate> = Vec::with_capacity(raw.len());
        for c in raw {
            if !candidates.contains(&c) {
                candidates.push(c);
            }
        }
        Self { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NextKeyCandidate> {
        self.candidates.iter()
    }

    pub fn contains(&self, letter: char) -> bool {
        self.candidates.iter().any(|c| c.letter == letter)
    }

    /// Distinct letters, in discovery order.
    pub fn letters(&self) -> Vec<char> {
        let mut out = Vec::new();
        for c in &self.candidates {
            if !out.contains(&c.letter) {
                out.push(c.letter);
            }
        }
        out
    }

    /// The candidate consumed by typing `letter`.
    ///
    /// Several branches may accept the same letter; one that finishes its
    /// spelling wins, so preference updates reflect a completed kana.
    pub fn candidate_for(&self, letter: char) -> Option<&NextKeyCandidate> {
        let mut matching = self.candidates.iter().filter(|c| c.letter == letter);
        let first = matching.next()?;
        if first.completes_spelling() {
            return Some(first);
        }
        Some(matching.find(|c| c.completes_spelling()).unwrap_or(first))
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Complete,
    Dead,
    Next(Vec<NextKeyCandidate>),
}

impl Outcome {
    fn merge(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Complete, _) | (_, Outcome::Complete) => Outcome::Complete,
            (Outcome::Dead, o) | (o, Outcome::Dead) => o,
            (Outcome::Next(mut a), Outcome::Next(b)) => {
                a.extend(b);
                Outcome::Next(a)
            }
        }
    }
}

/// Legal next characters for `phrase` given the `typed` prefix.
pub fn next_keys(table: &RomajiTable, phrase: &Phrase, typed: &str) -> NextKeys {
    next_keys_with(table, phrase, typed, PredictOptions::default())
}

pub fn next_keys_with(
    table: &RomajiTable,
    phrase: &Phrase,
    typed: &str,
    options: PredictOptions,
) -> NextKeys {
    let mut walker = Walker {
        table,
        units: phrase.units(),
        typed,
        options,
        memo: HashMap::new(),
    };
    let outcome = walker.walk(0, 0, Lead::Any);
    trace!(memo = walker.memo.len(), typed, "next_keys");

    match outcome {
        Outcome::Next(candidates) => NextKeys::from_candidates(candidates),
        // A dead prefix cannot be extended; it reads as "complete" so an
        // inconsistent state never stalls the caller.
        Outcome::Complete | Outcome::Dead => NextKeys::default(),
    }
}

/// One recursive pass; the memo lives exactly as long as the pass.
struct Walker<'a> {
    table: &'a RomajiTable,
    units: &'a [String],
    typed: &'a str,
    options: PredictOptions,
    memo: HashMap<(usize, usize, Lead), Outcome>,
}

impl Walker<'_> {
    fn walk(&mut self, index: usize, pos: usize, lead: Lead) -> Outcome {
        if let Some(hit) = self.memo.get(&(index, pos, lead)) {
            return hit.clone();
        }
        let outcome = self.walk_uncached(index, pos, lead);
        self.memo.insert((index, pos, lead), outcome.clone());
        outcome
    }

    fn walk_uncached(&mut self, index: usize, pos: usize, lead: Lead) -> Outcome {
        let units = self.units;
        let Some(unit) = units.get(index) else {
            return if pos == self.typed.len() {
                Outcome::Complete
            } else {
                Outcome::Dead
            };
        };
        let table = self.table;
        let spellings = table.spellings_for(unit);

        if spellings.is_empty() {
            return self.literal(index, pos, lead, unit);
        }

        let is_last = index + 1 == units.len();
        let mut outcome = self.spellings(index, pos, lead, unit, spellings);

        if unit == SOKUON && !is_last {
            outcome = outcome.merge(self.doubling(index, pos, lead));
        } else if unit == HATSUON {
            if !is_last {
                outcome = outcome.merge(self.single_n(index, pos, lead));
            } else if self.options.single_n_at_end && lead.admits("n") {
                let single = vec!["n".to_string()];
                outcome = outcome.merge(self.spellings(index, pos, lead, unit, &single));
            }
        }

        outcome
    }

    fn literal(&mut self, index: usize, pos: usize, lead: Lead, text: &str) -> Outcome {
        if !lead.admits(text) {
            return Outcome::Dead;
        }
        let typed = self.typed;
        let rest = &typed[pos..];
        if rest.starts_with(text) {
            return self.walk(index + 1, pos + text.len(), Lead::Any);
        }
        match text.strip_prefix(rest).and_then(|r| r.chars().next()) {
            Some(letter) => Outcome::Next(vec![NextKeyCandidate {
                letter,
                provenance: Provenance::Direct,
            }]),
            None => Outcome::Dead,
        }
    }

    /// Fork over every accepted spelling of `kana`.
    fn spellings(
        &mut self,
        index: usize,
        pos: usize,
        lead: Lead,
        kana: &str,
        spellings: &[String],
    ) -> Outcome {
        let typed = self.typed;
        let rest = &typed[pos..];
        let mut outcome = Outcome::Dead;

        for spelling in spellings {
            if !lead.admits(spelling) {
                continue;
            }
            if rest.starts_with(spelling.as_str()) {
                let after = self.walk(index + 1, pos + spelling.len(), Lead::Any);
                outcome = outcome.merge(after);
            } else if let Some(remaining) = spelling.strip_prefix(rest) {
                if let Some(letter) = remaining.chars().next() {
                    outcome = outcome.merge(Outcome::Next(vec![NextKeyCandidate {
                        letter,
                        provenance: Provenance::TableMatch {
                            kana: kana.to_string(),
                            spelling: spelling.clone(),
                            offset: rest.chars().count(),
                        },
                    }]));
                }
            }
        }

        outcome
    }

    /// っ spelled by doubling the first consonant of the following unit.
    fn doubling(&mut self, index: usize, pos: usize, lead: Lead) -> Outcome {
        let (table, units, typed) = (self.table, self.units, self.typed);
        let next = table.spellings_for(&units[index + 1]);
        let rest = &typed[pos..];
        let mut outcome = Outcome::Dead;

        for c in doubling_consonants(next) {
            let mut buf = [0u8; 4];
            if !lead.admits(c.encode_utf8(&mut buf)) {
                continue;
            }
            match rest.chars().next() {
                None => {
                    outcome = outcome.merge(Outcome::Next(vec![NextKeyCandidate {
                        letter: c,
                        provenance: Provenance::TableMatch {
                            kana: SOKUON.to_string(),
                            spelling: c.to_string(),
                            offset: 0,
                        },
                    }]));
                }
                Some(first) if first == c => {
                    let after = self.walk(index + 1, pos + c.len_utf8(), Lead::Exactly(c));
                    outcome = outcome.merge(after);
                }
                Some(_) => {}
            }
        }

        outcome
    }

    /// ん spelled as a lone `n` before a unit that cannot absorb it.
    ///
    /// Only contributes once the `n` is typed; before that, the `nn`
    /// spelling already offers `n` as a candidate.
    fn single_n(&mut self, index: usize, pos: usize, lead: Lead) -> Outcome {
        if !lead.admits("n") || !self.typed[pos..].starts_with('n') {
            return Outcome::Dead;
        }
        self.walk(index + 1, pos + 1, Lead::AfterSingleN)
    }
}
