use std::thread;
use std::time::Duration;

use super::*;
use crate::session::{
    key_channel, run_session, AbortReason, CancelToken, Presenter, SessionState, StepReport,
    SummaryOutcome, WaitError,
};

// --- Channel ---

#[test]
fn test_events_in_arrival_order() {
    let (feed, mut waiter) = key_channel();
    for c in "abc".chars() {
        feed.send(key(c)).unwrap();
    }
    for c in "abc".chars() {
        let token = waiter.token();
        assert_eq!(waiter.wait(&token).unwrap(), key(c));
    }
}

#[test]
fn test_tokens_are_fresh_per_cycle() {
    let (_feed, waiter) = key_channel();
    let a = waiter.token();
    let b = waiter.token();
    assert!(b.generation() > a.generation());
    a.cancel();
    assert!(a.is_cancelled());
    assert!(!b.is_cancelled());
}

#[test]
fn test_cancel_before_wait() {
    let (feed, mut waiter) = key_channel();
    let token = waiter.token();
    token.cancel();
    feed.send(key('a')).unwrap();
    assert_eq!(waiter.wait(&token), Err(WaitError::Cancelled));
}

#[test]
fn test_cancel_keeps_keys_queued_before_it() {
    let (feed, mut waiter) = key_channel();
    feed.send(key('a')).unwrap();
    let token = waiter.token();
    token.cancel();
    assert_eq!(waiter.wait(&token), Err(WaitError::Cancelled));
    feed.send(key('b')).unwrap();
    let next = waiter.token();
    assert_eq!(waiter.wait(&next).unwrap(), key('a'));
    assert_eq!(waiter.wait(&next).unwrap(), key('b'));
}

#[test]
fn test_cancel_drops_keys_queued_after_it() {
    let (feed, mut waiter) = key_channel();
    feed.send(key('a')).unwrap();
    let token = waiter.token();
    token.cancel();
    feed.send(key('x')).unwrap();
    assert_eq!(waiter.wait(&token), Err(WaitError::Cancelled));
    feed.send(key('b')).unwrap();
    let next = waiter.token();
    assert_eq!(waiter.wait(&next).unwrap(), key('a'));
    assert_eq!(waiter.wait(&next).unwrap(), key('b'));
}

#[test]
fn test_cancel_from_thread_while_blocked() {
    let (feed, mut waiter) = key_channel();
    let token = waiter.token();
    let remote = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.cancel();
        feed
    });
    assert_eq!(waiter.wait(&token), Err(WaitError::Cancelled));
    let feed = handle.join().unwrap();
    feed.send(key('b')).unwrap();
    let next = waiter.token();
    assert_eq!(waiter.wait(&next).unwrap(), key('b'));
}

#[test]
fn test_stale_cancel_does_not_reach_new_cycle() {
    let (feed, mut waiter) = key_channel();
    let old = waiter.token();
    let current = waiter.token();
    old.cancel();
    feed.send(key('z')).unwrap();
    assert_eq!(waiter.wait(&current).unwrap(), key('z'));
}

#[test]
fn test_disconnect_when_feeds_dropped() {
    let (feed, mut waiter) = key_channel();
    let clone = feed.clone();
    drop(feed);
    clone.send(key('a')).unwrap();
    drop(clone);
    let token = waiter.token();
    assert_eq!(waiter.wait(&token).unwrap(), key('a'));
    assert_eq!(waiter.wait(&token), Err(WaitError::Disconnected));
    // Stays disconnected.
    let token = waiter.token();
    assert_eq!(waiter.wait(&token), Err(WaitError::Disconnected));
}

#[test]
fn test_source_failure() {
    let (feed, mut waiter) = key_channel();
    feed.fail("device unplugged").unwrap();
    let token = waiter.token();
    assert_eq!(
        waiter.wait(&token),
        Err(WaitError::Source("device unplugged".to_string()))
    );
}

#[test]
fn test_send_after_waiter_dropped() {
    let (feed, waiter) = key_channel();
    drop(waiter);
    assert_eq!(feed.send(key('a')), Err(WaitError::Disconnected));
}

// --- Driver ---

#[derive(Default)]
struct Recorder {
    waits: usize,
    steps: Vec<StepReport>,
    tokens: Vec<CancelToken>,
    cancel_after: Option<usize>,
}

impl Presenter for Recorder {
    fn on_wait(&mut self, _session: &TypingSession<'_>, token: &CancelToken) {
        self.waits += 1;
        self.tokens.push(token.clone());
        if self.cancel_after == Some(self.steps.len()) {
            token.cancel();
        }
    }

    fn on_step(&mut self, _session: &TypingSession<'_>, report: &StepReport) {
        self.steps.push(report.clone());
    }
}

#[test]
fn test_run_session_to_completion() {
    let (feed, mut waiter) = key_channel();
    let mut session = make_session(&["すし"], config(ModeSettings::default()));
    feed.send(space()).unwrap();
    for c in "sushi".chars() {
        feed.send(key(c)).unwrap();
    }

    let mut recorder = Recorder::default();
    let summary = run_session(&mut session, &mut waiter, &mut recorder);
    assert_eq!(summary.outcome, SummaryOutcome::Completed);
    assert_eq!(summary.hits, 5);
    assert_eq!(recorder.waits, 6);
    assert_eq!(recorder.steps.len(), 6);
    assert!(recorder.steps.last().unwrap().phrase_completed);
    // Every cycle's token is retired once the cycle is over.
    assert!(recorder.tokens.iter().all(CancelToken::is_cancelled));
}

#[test]
fn test_run_session_cancelled() {
    let (feed, mut waiter) = key_channel();
    let mut session = make_session(&["すし"], config(ModeSettings::default()));
    feed.send(space()).unwrap();
    feed.send(key('s')).unwrap();
    feed.send(key('u')).unwrap();

    let mut recorder = Recorder {
        cancel_after: Some(2),
        ..Recorder::default()
    };
    let summary = run_session(&mut session, &mut waiter, &mut recorder);
    assert_eq!(session.state(), SessionState::Aborted);
    assert_eq!(session.abort_reason(), Some(&AbortReason::Cancelled));
    assert_eq!(
        summary.outcome,
        SummaryOutcome::Aborted {
            reason: AbortReason::Cancelled
        }
    );
    // The 'u' queued before the cancel never reached the session but is
    // still waiting for the next cycle.
    assert_eq!(summary.hits, 1);
    let next = waiter.token();
    assert_eq!(waiter.wait(&next).unwrap(), key('u'));
}

#[test]
fn test_run_session_source_failure() {
    let (feed, mut waiter) = key_channel();
    let mut session = make_session(&["すし"], config(ModeSettings::default()));
    feed.send(space()).unwrap();
    feed.fail("boom").unwrap();

    let summary = run_session(&mut session, &mut waiter, &mut Recorder::default());
    match summary.outcome {
        SummaryOutcome::Aborted {
            reason: AbortReason::Failed(message),
        } => assert!(message.contains("boom")),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_run_session_feed_from_thread() {
    let (feed, mut waiter) = key_channel();
    let mut session = make_session(&["かに"], config(ModeSettings::default()));
    let handle = thread::spawn(move || {
        feed.send(space()).unwrap();
        for c in "kani".chars() {
            thread::sleep(Duration::from_millis(2));
            feed.send(key(c)).unwrap();
        }
    });
    let summary = run_session(&mut session, &mut waiter, &mut Recorder::default());
    handle.join().unwrap();
    assert_eq!(summary.outcome, SummaryOutcome::Completed);
    assert_eq!(summary.issues_completed, 1);
}

#[test]
fn test_run_session_disconnect_aborts() {
    let (feed, mut waiter) = key_channel();
    let mut session = make_session(&["かに"], config(ModeSettings::default()));
    feed.send(space()).unwrap();
    drop(feed);
    let summary = run_session(&mut session, &mut waiter, &mut Recorder::default());
    assert!(matches!(
        summary.outcome,
        SummaryOutcome::Aborted {
            reason: AbortReason::Failed(_)
        }
    ));
}
