mod key_wait;
mod proptest_fsm;

use std::time::{Duration, Instant};

use crate::keyboard::{KeyEvent, KeyTranslator, LayoutSet};
use crate::phrase::Phrase;
use crate::romaji::RomajiTable;
use crate::settings::ModeSettings;

use super::{SessionConfig, StepReport, TypingSession};

pub(super) fn config(mode: ModeSettings) -> SessionConfig {
    SessionConfig {
        speed_window: 3,
        mode,
        ..SessionConfig::default()
    }
}

pub(super) fn make_session(texts: &[&str], config: SessionConfig) -> TypingSession<'static> {
    let table = RomajiTable::global();
    let issues = texts.iter().map(|t| Phrase::parse(t, table)).collect();
    let translator = KeyTranslator::from_names(LayoutSet::global(), "qwerty", "qwerty").unwrap();
    TypingSession::new(table, translator, config, issues).unwrap()
}

pub(super) fn key(ch: char) -> KeyEvent {
    KeyEvent::for_char(ch).unwrap()
}

pub(super) fn space() -> KeyEvent {
    KeyEvent::new("Space", false)
}

pub(super) fn escape() -> KeyEvent {
    KeyEvent::new("Escape", false)
}

/// Simulated clock: every key lands 100ms after the previous one.
pub(super) struct Clock {
    now: Instant,
}

impl Clock {
    pub(super) fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    pub(super) fn tick(&mut self) -> Instant {
        self.now += Duration::from_millis(100);
        self.now
    }
}

pub(super) fn start(session: &mut TypingSession<'_>, clock: &mut Clock) -> StepReport {
    session.handle_key(&space(), clock.tick())
}

pub(super) fn type_text(
    session: &mut TypingSession<'_>,
    clock: &mut Clock,
    text: &str,
) -> Vec<StepReport> {
    text.chars()
        .map(|c| session.handle_key(&key(c), clock.tick()))
        .collect()
}
