use std::time::Instant;

use tracing::{debug, warn};

use super::key_wait::{CancelToken, KeyWaiter, TokenGuard, WaitError};
use super::state::AbortReason;
use super::stats::SessionSummary;
use super::{StepReport, TypingSession};

/// Presentation hooks called by [`run_session`].
pub trait Presenter {
    /// A new await cycle begins. Keep a clone of `token` to cancel the wait
    /// from elsewhere (scene change, Ctrl-C).
    fn on_wait(&mut self, _session: &TypingSession<'_>, _token: &CancelToken) {}

    /// A key event was processed.
    fn on_step(&mut self, session: &TypingSession<'_>, report: &StepReport);
}

/// Drive `session` until it reaches a terminal state.
///
/// Every cycle mints a fresh token; the token is retired when the cycle ends
/// however it ends, so a stale cancel cannot reach a later wait.
pub fn run_session(
    session: &mut TypingSession<'_>,
    waiter: &mut KeyWaiter,
    presenter: &mut dyn Presenter,
) -> SessionSummary {
    while !session.state().is_terminal() {
        let token = waiter.token();
        let _guard = TokenGuard(&token);
        presenter.on_wait(session, &token);

        match waiter.wait(&token) {
            Ok(event) => {
                let report = session.handle_key(&event, Instant::now());
                presenter.on_step(session, &report);
            }
            Err(WaitError::Cancelled) => {
                debug!(generation = token.generation(), "wait cancelled; aborting");
                session.abort(AbortReason::Cancelled, Instant::now());
            }
            Err(err) => {
                warn!(%err, "key source failed; aborting");
                session.abort(AbortReason::Failed(err.to_string()), Instant::now());
            }
        }
    }
    session.summary()
}
