//! Cancellable key wait over a std channel.
//!
//! The platform pushes events through a [`KeyFeed`]; the controller pulls
//! them through a [`KeyWaiter`], one [`CancelToken`] per await cycle. Tokens
//! are ordered by a shared generation counter: cancelling a token marks every
//! generation up to its own as dead, so a late cancel from an old cycle never
//! touches a newer wait.
//!
//! A cancel enqueues a wake marker behind whatever keys are already waiting.
//! Keys ahead of the marker arrived before the cancel and are held for the
//! next wait; keys behind it are dropped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};

use tracing::{debug, trace};

use crate::keyboard::KeyEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    #[error("key wait cancelled")]
    Cancelled,
    #[error("key source disconnected")]
    Disconnected,
    #[error("key source failed: {0}")]
    Source(String),
}

enum Signal {
    Key(KeyEvent),
    /// The token of this generation was cancelled. Queue position marks
    /// the cancel point.
    Wake(u64),
    Failed(String),
    Closed,
}

struct Generations {
    minted: AtomicU64,
    /// Every token with a generation at or below this is dead.
    retired: AtomicU64,
}

/// Sends `Closed` once the last feed clone is gone.
struct FeedAlive {
    tx: mpsc::Sender<Signal>,
}

impl Drop for FeedAlive {
    fn drop(&mut self) {
        let _ = self.tx.send(Signal::Closed);
    }
}

/// Platform side of the channel. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct KeyFeed {
    tx: mpsc::Sender<Signal>,
    _alive: Arc<FeedAlive>,
}

impl KeyFeed {
    /// Deliver one key event. Fails once the waiter is gone.
    pub fn send(&self, event: KeyEvent) -> Result<(), WaitError> {
        self.tx
            .send(Signal::Key(event))
            .map_err(|_| WaitError::Disconnected)
    }

    /// Report a fatal platform error to the controller.
    pub fn fail(&self, message: impl Into<String>) -> Result<(), WaitError> {
        self.tx
            .send(Signal::Failed(message.into()))
            .map_err(|_| WaitError::Disconnected)
    }
}

/// Cancellation handle for exactly one await cycle.
#[derive(Clone)]
pub struct CancelToken {
    generation: u64,
    gens: Arc<Generations>,
    tx: mpsc::Sender<Signal>,
}

impl CancelToken {
    /// Cancel this cycle and wake the waiter. Safe from any thread; a no-op
    /// once the cycle is over.
    pub fn cancel(&self) {
        let prev = self.gens.retired.fetch_max(self.generation, Ordering::SeqCst);
        if prev < self.generation {
            debug!(generation = self.generation, "key wait cancelled");
            let _ = self.tx.send(Signal::Wake(self.generation));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.gens.retired.load(Ordering::SeqCst) >= self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// End the cycle without waking anyone.
    pub(crate) fn retire(&self) {
        self.gens.retired.fetch_max(self.generation, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("generation", &self.generation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Controller side of the channel.
pub struct KeyWaiter {
    rx: mpsc::Receiver<Signal>,
    tx: mpsc::Sender<Signal>,
    gens: Arc<Generations>,
    /// Keys that arrived before a cancel, delivered ahead of the channel.
    held: VecDeque<KeyEvent>,
    closed: Option<WaitError>,
}

/// Create a connected feed/waiter pair.
pub fn key_channel() -> (KeyFeed, KeyWaiter) {
    let (tx, rx) = mpsc::channel();
    let feed = KeyFeed {
        tx: tx.clone(),
        _alive: Arc::new(FeedAlive { tx: tx.clone() }),
    };
    let waiter = KeyWaiter {
        rx,
        tx,
        gens: Arc::new(Generations {
            minted: AtomicU64::new(0),
            retired: AtomicU64::new(0),
        }),
        held: VecDeque::new(),
        closed: None,
    };
    (feed, waiter)
}

impl KeyWaiter {
    /// Mint the token for a new await cycle.
    pub fn token(&self) -> CancelToken {
        let generation = self.gens.minted.fetch_add(1, Ordering::SeqCst) + 1;
        CancelToken {
            generation,
            gens: Arc::clone(&self.gens),
            tx: self.tx.clone(),
        }
    }

    /// Block until the next key event for `token`'s cycle.
    ///
    /// On cancellation, keys queued before the cancel are kept for the next
    /// cycle and keys that arrived after it are dropped.
    pub fn wait(&mut self, token: &CancelToken) -> Result<KeyEvent, WaitError> {
        if token.is_cancelled() {
            return self.cancelled(token, false);
        }
        if let Some(event) = self.held.pop_front() {
            return Ok(event);
        }
        if let Some(err) = &self.closed {
            return Err(err.clone());
        }
        loop {
            if token.is_cancelled() {
                return self.cancelled(token, false);
            }
            let signal = self.rx.recv().map_err(|_| WaitError::Disconnected);
            match signal {
                Ok(Signal::Key(event)) => {
                    if token.is_cancelled() {
                        // Ahead of the wake marker, so it predates the cancel.
                        self.held.push_back(event);
                        continue;
                    }
                    return Ok(event);
                }
                Ok(Signal::Wake(generation)) => {
                    if generation == token.generation {
                        return self.cancelled(token, true);
                    }
                }
                Ok(Signal::Failed(message)) => {
                    let err = WaitError::Source(message);
                    self.closed = Some(err.clone());
                    return Err(err);
                }
                Ok(Signal::Closed) | Err(_) => {
                    self.closed = Some(WaitError::Disconnected);
                    return Err(WaitError::Disconnected);
                }
            }
        }
    }

    /// Sort what is queued into keys before and after `token`'s wake marker.
    fn cancelled(
        &mut self,
        token: &CancelToken,
        mut past_marker: bool,
    ) -> Result<KeyEvent, WaitError> {
        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                Signal::Key(event) if past_marker => {
                    trace!(?event, "dropping key queued after cancel");
                }
                Signal::Key(event) => self.held.push_back(event),
                Signal::Wake(generation) => {
                    if generation == token.generation {
                        past_marker = true;
                    }
                }
                Signal::Failed(message) => {
                    self.closed = Some(WaitError::Source(message));
                }
                Signal::Closed => {
                    self.closed = Some(WaitError::Disconnected);
                }
            }
        }
        debug!(held = self.held.len(), "key wait ended by cancel");
        Err(WaitError::Cancelled)
    }
}

/// Retires a token when the await cycle ends, on every exit path.
pub(crate) struct TokenGuard<'a>(pub(crate) &'a CancelToken);

impl Drop for TokenGuard<'_> {
    fn drop(&mut self) {
        self.0.retire();
    }
}
