//! Property-based tests for the TypingSession state machine.
//!
//! Generates random key streams via proptest and verifies that counters
//! and state transitions stay consistent after every event.

use proptest::prelude::*;

use super::*;
use crate::session::{KeyOutcome, SessionState, SummaryOutcome};

// ---------------------------------------------------------------------------
// Action enum: every key the player can produce
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Action {
    /// Type the character the hint expects next.
    Expected,
    Type(char),
    Start,
    Abort,
    Modifier,
}

fn arb_char() -> impl Strategy<Value = char> {
    prop_oneof![
        3 => prop::sample::select(vec!['a', 'i', 'u', 'e', 'o']),
        2 => prop::sample::select(vec![
            'k', 's', 't', 'n', 'h', 'm', 'y', 'r', 'w', 'g', 'z', 'd', 'b', 'p', 'c', 'f',
            'j', 'l', 'x',
        ]),
        1 => prop::sample::select(vec![',', '.', '-', '1']),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        40 => Just(Action::Expected),
        30 => arb_char().prop_map(Action::Type),
        5 => Just(Action::Start),
        1 => Just(Action::Abort),
        3 => Just(Action::Modifier),
    ]
}

fn arb_mode() -> impl Strategy<Value = ModeSettings> {
    (any::<bool>(), any::<bool>()).prop_map(|(on_miss, per_unit)| ModeSettings {
        clear_typed_on_miss: on_miss,
        clear_typed_per_unit: per_unit,
        ..ModeSettings::default()
    })
}

const PHRASES: &[&str] = &[
    "とうきょう",
    "がっこう",
    "かんじ",
    "こんな",
    "しゃしん",
    "はい、そう。",
    "ほん",
];

fn arb_issues() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(PHRASES.to_vec()), 1..4)
}

// ---------------------------------------------------------------------------
// Execute an Action against the session
// ---------------------------------------------------------------------------

fn event_for(session: &TypingSession<'_>, action: &Action) -> KeyEvent {
    match action {
        Action::Expected => session
            .hint()
            .get(session.typed().len()..)
            .and_then(|rest| rest.chars().next())
            .and_then(KeyEvent::for_char)
            .unwrap_or_else(|| KeyEvent::new("KeyQ", false)),
        Action::Type(c) => key(*c),
        Action::Start => space(),
        Action::Abort => escape(),
        Action::Modifier => KeyEvent::new("ControlLeft", false),
    }
}

// ---------------------------------------------------------------------------
// Invariant checks: run after every event
// ---------------------------------------------------------------------------

fn assert_invariants(
    session: &TypingSession<'_>,
    report: &StepReport,
    action: &Action,
    before: SessionState,
) {
    let c = session.counters();

    // 1. Attempts are exactly hits plus misses.
    assert_eq!(c.attempts, c.hits + c.misses, "after {action:?}");

    // 2. Combo never exceeds its maximum.
    assert!(c.combo <= c.max_combo, "after {action:?}");

    // 3. State only moves along the transition table.
    let after = session.state();
    assert!(
        before == after || before.can_transition(after),
        "{before:?} -> {after:?} after {action:?}",
    );
    assert_eq!(report.state, after);

    // 4. Terminal states ignore input.
    if before.is_terminal() {
        assert_eq!(report.outcome, KeyOutcome::Ignored, "after {action:?}");
    }

    // 5. A live session always has something left to type.
    if after == SessionState::Active {
        assert!(!session.next_keys().is_empty(), "stalled after {action:?}");
        assert!(session.current_phrase().is_some());
    }

    // 6. Completion implies every issue finished.
    if after == SessionState::Complete {
        assert_eq!(session.issues_completed(), session.issue_count());
    }

    // 7. The typed prefix is always consistent with the hint.
    if after == SessionState::Active {
        assert!(
            session.hint().starts_with(session.typed()),
            "hint {:?} does not extend typed {:?} after {action:?}",
            session.hint(),
            session.typed(),
        );
    }

    // 8. Hits only ever come from candidates.
    if let KeyOutcome::Hit(_) = report.outcome {
        assert_eq!(before, SessionState::Active);
    }
}

// ---------------------------------------------------------------------------
// proptest entry point
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn session_invariants_hold(
        issues in arb_issues(),
        mode in arb_mode(),
        actions in prop::collection::vec(arb_action(), 1..120),
    ) {
        let mut clock = Clock::new();
        let mut session = make_session(&issues, config(mode));
        for action in &actions {
            let before = session.state();
            let event = event_for(&session, action);
            let report = session.handle_key(&event, clock.tick());
            assert_invariants(&session, &report, action, before);
        }
        let summary = session.summary();
        prop_assert_eq!(summary.hits + summary.misses, session.counters().attempts);
        prop_assert_eq!(summary.missed_chars.len() as u32, summary.misses);
        if session.state() == SessionState::Complete {
            prop_assert_eq!(summary.outcome, SummaryOutcome::Completed);
        }
    }

    #[test]
    fn expected_keys_always_complete(issues in arb_issues(), mode in arb_mode()) {
        let mut clock = Clock::new();
        let mut session = make_session(&issues, config(mode));
        start(&mut session, &mut clock);
        for _ in 0..500 {
            if session.state() != SessionState::Active {
                break;
            }
            let event = event_for(&session, &Action::Expected);
            let report = session.handle_key(&event, clock.tick());
            prop_assert!(matches!(report.outcome, KeyOutcome::Hit(_)), "{:?}", report);
        }
        prop_assert_eq!(session.state(), SessionState::Complete);
        prop_assert_eq!(session.counters().misses, 0);
    }
}
