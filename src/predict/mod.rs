//! Input prediction over ambiguous romanizations.
//!
//! [`next_keys`] answers "which characters may legally come next" for a
//! phrase and the text typed so far; [`resolve`] picks the single most
//! likely full romanization for hint display, biased by
//! [`SpellingPreference`].

mod lead;
mod next_keys;
mod preference;
mod resolver;

#[cfg(test)]
mod tests;

pub use next_keys::{next_keys, next_keys_with, NextKeyCandidate, NextKeys, Provenance};
pub use preference::SpellingPreference;
pub use resolver::{best_guess, canonical_spelling, resolve, resolve_with, Guess};

/// Knobs shared by the predictor and the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictOptions {
    /// Accept a single `n` for a phrase-final ん.
    pub single_n_at_end: bool,
}
