//! Typing session controller.
//!
//! `TypingSession` owns the per-session mutable state (typed prefix,
//! spelling preferences, counters) and advances it one key event at a time.
//! [`run_session`] drives it from a [`KeyWaiter`].

mod driver;
mod key_wait;
mod state;
mod stats;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tracing::{debug, debug_span};

use crate::keyboard::{KeyEvent, KeyTranslator, LayoutError, UNKNOWN_KEY_INDEX};
use crate::phrase::Phrase;
use crate::predict::{next_keys_with, resolve_with, Guess, NextKeys, PredictOptions, SpellingPreference};
use crate::romaji::{RomajiTable, HATSUON, SOKUON};
use crate::settings::{ModeSettings, Settings};

pub use driver::{run_session, Presenter};
pub use key_wait::{key_channel, CancelToken, KeyFeed, KeyWaiter, WaitError};
pub use state::{AbortReason, SessionState};
pub use stats::{Counters, SessionSummary, SpeedWindow, SummaryOutcome};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("session has no issues")]
    NoIssues,
}

/// Per-session knobs, resolved from [`Settings`] and one difficulty mode.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub speed_window: usize,
    pub start_key: String,
    pub abort_key: String,
    pub predict: PredictOptions,
    pub mode: ModeSettings,
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings, mode: &str) -> Result<Self, SessionError> {
        let mode = settings
            .mode(mode)
            .ok_or_else(|| SessionError::UnknownMode(mode.to_string()))?;
        Ok(Self {
            speed_window: settings.session.speed_window,
            start_key: settings.session.start_key.clone(),
            abort_key: settings.session.abort_key.clone(),
            predict: PredictOptions {
                single_n_at_end: settings.session.single_n_at_end,
            },
            mode: mode.clone(),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speed_window: 10,
            start_key: "Space".to_string(),
            abort_key: "Escape".to_string(),
            predict: PredictOptions::default(),
            mode: ModeSettings::default(),
        }
    }
}

/// What a single key event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Started,
    Hit(char),
    Miss { typed: char, expected: Option<char> },
    Aborted,
    /// Not a typing key, or not meaningful in the current state.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub outcome: KeyOutcome,
    /// At least one more kana unit of the current phrase is fully typed.
    pub unit_completed: bool,
    /// The phrase was finished and the session moved on.
    pub phrase_completed: bool,
    pub state: SessionState,
}

/// Snapshot for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub issue: usize,
    pub issue_count: usize,
    pub phrase: String,
    pub typed: String,
    pub hint: String,
    pub candidates: Vec<char>,
    pub counters: Counters,
    pub speed: Option<f64>,
    pub elapsed: Duration,
    pub show_keyboard: bool,
    pub highlight: usize,
}

pub struct TypingSession<'t> {
    table: &'t RomajiTable,
    translator: KeyTranslator,
    config: SessionConfig,
    issues: Vec<Phrase>,

    state: SessionState,
    abort_reason: Option<AbortReason>,
    current: usize,
    typed: String,
    /// Leading units of the current issue already confirmed and dropped
    /// from `typed` (per-unit clearing mode only).
    unit_offset: usize,
    /// Units of the prediction window fully covered by `typed`.
    units_done: usize,
    preference: SpellingPreference,

    // Derived from (current phrase, typed); refreshed after every change.
    keys: NextKeys,
    guess: Guess,

    counters: Counters,
    speed: SpeedWindow,
    peak_speed: Option<f64>,
    missed: Vec<char>,
    issues_completed: usize,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl<'t> TypingSession<'t> {
    pub fn new(
        table: &'t RomajiTable,
        translator: KeyTranslator,
        config: SessionConfig,
        issues: Vec<Phrase>,
    ) -> Result<Self, SessionError> {
        if issues.is_empty() {
            return Err(SessionError::NoIssues);
        }
        let speed = SpeedWindow::new(config.speed_window);
        let mut session = Self {
            table,
            translator,
            config,
            issues,
            state: SessionState::AwaitingStart,
            abort_reason: None,
            current: 0,
            typed: String::new(),
            unit_offset: 0,
            units_done: 0,
            preference: SpellingPreference::new(),
            keys: NextKeys::default(),
            guess: Guess {
                text: String::new(),
                spellings: Vec::new(),
            },
            counters: Counters::default(),
            speed,
            peak_speed: None,
            missed: Vec::new(),
            issues_completed: 0,
            started_at: None,
            ended_at: None,
        };
        session.refresh();
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        self.abort_reason.as_ref()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn preference(&self) -> &SpellingPreference {
        &self.preference
    }

    /// Keys typed toward the current issue. In per-unit clearing mode only
    /// the keys of units not yet confirmed.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn hint(&self) -> &str {
        &self.guess.text
    }

    pub fn next_keys(&self) -> &NextKeys {
        &self.keys
    }

    pub fn current_phrase(&self) -> Option<&Phrase> {
        self.issues.get(self.current)
    }

    pub fn issue_index(&self) -> usize {
        self.current
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn issues_completed(&self) -> usize {
        self.issues_completed
    }

    pub fn translator(&self) -> &KeyTranslator {
        &self.translator
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Instantaneous speed in keys per second, once the window is full.
    pub fn speed(&self) -> Option<f64> {
        self.speed.speed()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => self.ended_at.unwrap_or(now).saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// Grid index of the key the player should press next.
    pub fn highlight_position(&self) -> usize {
        if self.state != SessionState::Active {
            return UNKNOWN_KEY_INDEX;
        }
        self.guess
            .char_at(self.typed.len())
            .map_or(UNKNOWN_KEY_INDEX, |ch| self.translator.highlight_index(ch))
    }

    pub fn view(&self) -> SessionView {
        self.view_at(Instant::now())
    }

    pub fn view_at(&self, now: Instant) -> SessionView {
        SessionView {
            state: self.state,
            issue: self.current,
            issue_count: self.issues.len(),
            phrase: self
                .current_phrase()
                .map(Phrase::text)
                .unwrap_or_default(),
            typed: self.typed.clone(),
            hint: self.guess.text.clone(),
            candidates: self.keys.letters(),
            counters: self.counters,
            speed: self.speed.speed(),
            elapsed: self.elapsed(now),
            show_keyboard: self.config.mode.show_keyboard,
            highlight: self.highlight_position(),
        }
    }

    /// Process one key event received at `now`.
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> StepReport {
        let _span = debug_span!("handle_key", ?event).entered();

        match self.state {
            SessionState::AwaitingStart => self.handle_awaiting(event, now),
            SessionState::Active => self.handle_active(event, now),
            SessionState::Complete | SessionState::Aborted => self.report(KeyOutcome::Ignored),
        }
    }

    /// End the session early. No-op once terminal.
    pub fn abort(&mut self, reason: AbortReason, now: Instant) {
        if self.state.is_terminal() {
            return;
        }
        debug!(?reason, "session aborted");
        self.abort_reason = Some(reason);
        self.ended_at = Some(now);
        self.transition(SessionState::Aborted);
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary_at(Instant::now())
    }

    pub fn summary_at(&self, now: Instant) -> SessionSummary {
        let outcome = match (self.state, &self.abort_reason) {
            (SessionState::Complete, _) => SummaryOutcome::Completed,
            (SessionState::Aborted, Some(reason)) => SummaryOutcome::Aborted {
                reason: reason.clone(),
            },
            (SessionState::Aborted, None) => SummaryOutcome::Aborted {
                reason: AbortReason::User,
            },
            _ => SummaryOutcome::InProgress,
        };
        let elapsed = self.elapsed(now);
        SessionSummary {
            outcome,
            hits: self.counters.hits,
            misses: self.counters.misses,
            accuracy: self.counters.accuracy(),
            max_combo: self.counters.max_combo,
            average_speed: stats::average_speed(self.counters.hits, elapsed),
            peak_speed: self.peak_speed,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            missed_chars: self.missed.clone(),
            issues_completed: self.issues_completed,
            issues_total: self.issues.len(),
        }
    }

    fn handle_awaiting(&mut self, event: &KeyEvent, now: Instant) -> StepReport {
        if event.code == self.config.abort_key {
            self.abort(AbortReason::User, now);
            return self.report(KeyOutcome::Aborted);
        }
        if event.code != self.config.start_key {
            return self.report(KeyOutcome::Ignored);
        }

        self.preference = SpellingPreference::new();
        self.started_at = Some(now);
        self.transition(SessionState::Active);
        let skipped = self.skip_finished_issues(now);
        StepReport {
            phrase_completed: skipped,
            ..self.report(KeyOutcome::Started)
        }
    }

    fn handle_active(&mut self, event: &KeyEvent, now: Instant) -> StepReport {
        if event.code == self.config.abort_key {
            self.abort(AbortReason::User, now);
            return self.report(KeyOutcome::Aborted);
        }
        let Some(ch) = self.translator.translate(event) else {
            return self.report(KeyOutcome::Ignored);
        };

        self.speed.push(now);
        if let Some(candidate) = self.keys.candidate_for(ch) {
            if candidate.completes_spelling() {
                if let (Some(kana), Some(spelling)) =
                    (candidate.source_kana(), candidate.source_spelling())
                {
                    self.preference.record(kana, spelling);
                }
            }
            self.typed.push(ch);
            self.counters.hit();
            if let Some(speed) = self.speed.speed() {
                self.peak_speed = Some(self.peak_speed.map_or(speed, |p| p.max(speed)));
            }
            self.refresh();
            self.transition(SessionState::Active);

            let covered = self.guess.units_covered(self.typed.len());
            let unit_completed = covered > self.units_done;
            self.record_covered(covered);
            self.units_done = self.units_done.max(covered);
            if self.config.mode.clear_typed_per_unit {
                self.commit_units();
            }

            let phrase_completed = self.skip_finished_issues(now);
            StepReport {
                outcome: KeyOutcome::Hit(ch),
                unit_completed: unit_completed || phrase_completed,
                phrase_completed,
                state: self.state,
            }
        } else {
            let expected = self.guess.char_at(self.typed.len());
            debug!(typed = %ch, ?expected, "miss");
            self.counters.miss();
            if let Some(expected) = expected {
                self.missed.push(expected);
            }
            if self.config.mode.clear_typed_on_miss {
                self.typed.clear();
                self.units_done = 0;
                self.refresh();
            }
            self.report(KeyOutcome::Miss {
                typed: ch,
                expected,
            })
        }
    }

    /// Remember the spelling of every unit finished since the last key.
    ///
    /// Catches spellings no single candidate completes, such as ん typed as
    /// a lone `n` and confirmed by the next consonant.
    fn record_covered(&mut self, covered: usize) {
        let Some(phrase) = self.issues.get(self.current) else {
            return;
        };
        for i in self.units_done..covered {
            let unit = phrase.unit(self.unit_offset + i);
            if let (Some(unit), Some(spelling)) = (unit, self.guess.spellings.get(i)) {
                if self.table.contains(unit) {
                    self.preference.record(unit, spelling);
                }
            }
        }
    }

    /// Move past every issue whose candidate set is empty, finishing the
    /// session after the last one. Returns whether any issue was finished.
    fn skip_finished_issues(&mut self, now: Instant) -> bool {
        let mut finished = false;
        while self.state == SessionState::Active && self.keys.is_empty() {
            finished = true;
            self.issues_completed += 1;
            debug!(
                issue = self.current,
                typed = %self.typed,
                "issue complete"
            );
            self.current += 1;
            self.typed.clear();
            self.unit_offset = 0;
            self.units_done = 0;
            if self.current >= self.issues.len() {
                self.ended_at = Some(now);
                self.transition(SessionState::Complete);
            } else {
                self.refresh();
            }
        }
        finished
    }

    /// Drop the confirmed units from the prediction window and their keys
    /// from `typed`.
    ///
    /// Stops before a unit whose spelling constrains the next one (っ as a
    /// doubled consonant, ん as a lone `n`); such a unit is dropped together
    /// with its successor.
    fn commit_units(&mut self) {
        let Some(phrase) = self.issues.get(self.current) else {
            return;
        };
        let mut commit = 0;
        let mut consumed = 0;
        let mut len = 0;
        for (i, spelling) in self.guess.spellings.iter().take(self.units_done).enumerate() {
            len += spelling.len();
            let unit = phrase.unit(self.unit_offset + i).unwrap_or_default();
            let binds_next = (unit == SOKUON && spelling.chars().count() == 1)
                || (unit == HATSUON && spelling == "n");
            if !binds_next {
                commit = i + 1;
                consumed = len;
            }
        }
        if commit == 0 {
            return;
        }
        debug!(units = commit, offset = self.unit_offset, "units confirmed");
        self.unit_offset += commit;
        self.units_done -= commit;
        self.typed.drain(..consumed);
        self.refresh();
    }

    fn refresh(&mut self) {
        let Some(phrase) = self.issues.get(self.current) else {
            self.keys = NextKeys::default();
            return;
        };
        let window;
        let phrase = if self.unit_offset == 0 {
            phrase
        } else {
            window = phrase.window(self.unit_offset, phrase.len() - self.unit_offset);
            &window
        };
        let options = self.config.predict;
        self.keys = next_keys_with(self.table, phrase, &self.typed, options);
        self.guess = resolve_with(self.table, &self.preference, phrase, &self.typed, options);
    }

    fn transition(&mut self, to: SessionState) {
        debug_assert!(
            self.state.can_transition(to),
            "illegal transition {:?} -> {:?}",
            self.state,
            to
        );
        if self.state != to {
            debug!(from = ?self.state, ?to, "transition");
        }
        self.state = to;
    }

    fn report(&self, outcome: KeyOutcome) -> StepReport {
        StepReport {
            outcome,
            unit_completed: false,
            phrase_completed: false,
            state: self.state,
        }
    }
}
