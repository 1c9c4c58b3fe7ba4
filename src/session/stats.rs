use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::state::AbortReason;

/// Running keystroke counters. `attempts` counts every judged key, so
/// `attempts == hits + misses` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub hits: u32,
    pub misses: u32,
    pub attempts: u32,
    pub combo: u32,
    pub max_combo: u32,
}

impl Counters {
    pub fn hit(&mut self) {
        self.hits += 1;
        self.attempts += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    pub fn miss(&mut self) {
        self.misses += 1;
        self.attempts += 1;
        self.combo = 0;
    }

    /// Fraction of judged keys that were hits; 0 before the first key.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.hits) / f64::from(self.attempts)
    }
}

/// Timestamps of the last `capacity` keystrokes.
#[derive(Debug, Clone)]
pub struct SpeedWindow {
    capacity: usize,
    stamps: VecDeque<Instant>,
}

impl SpeedWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            stamps: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, at: Instant) {
        if self.capacity == 0 {
            return;
        }
        if self.stamps.len() == self.capacity {
            self.stamps.pop_front();
        }
        self.stamps.push_back(at);
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.stamps.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    /// Keys per second across the window; `None` until the window is full
    /// or when it spans no time.
    pub fn speed(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let (first, last) = (self.stamps.front()?, self.stamps.back()?);
        let span = last.duration_since(*first).as_secs_f64();
        if span <= 0.0 {
            return None;
        }
        Some((self.stamps.len() - 1) as f64 / span)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryOutcome {
    InProgress,
    Completed,
    Aborted { reason: AbortReason },
}

/// End-of-session figures handed to the statistics collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub outcome: SummaryOutcome,
    pub hits: u32,
    pub misses: u32,
    pub accuracy: f64,
    pub max_combo: u32,
    /// Correct keys per second over the whole session.
    pub average_speed: f64,
    pub peak_speed: Option<f64>,
    pub duration_ms: u64,
    /// The hint character that was due at each miss.
    pub missed_chars: Vec<char>,
    pub issues_completed: usize,
    pub issues_total: usize,
}

pub(crate) fn average_speed(hits: u32, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    f64::from(hits) / secs
}
