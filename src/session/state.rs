use serde::Serialize;

/// Controller states. `Complete` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingStart,
    Active,
    Complete,
    Aborted,
}

impl SessionState {
    /// Transition table. `Active -> Active` is a character advance.
    pub fn can_transition(self, to: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, to),
            (AwaitingStart, Active)
                | (AwaitingStart, Aborted)
                | (Active, Active)
                | (Active, Complete)
                | (Active, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Aborted)
    }
}

/// Why a session ended early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The player pressed the abort key.
    User,
    /// The key wait was cancelled (scene exit).
    Cancelled,
    /// The key source failed or went away.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;
    use super::*;

    const ALL: [SessionState; 4] = [AwaitingStart, Active, Complete, Aborted];

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Complete, Aborted] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn abort_reachable_from_live_states() {
        assert!(AwaitingStart.can_transition(Aborted));
        assert!(Active.can_transition(Aborted));
    }

    #[test]
    fn start_must_go_through_active() {
        assert!(AwaitingStart.can_transition(Active));
        assert!(!AwaitingStart.can_transition(Complete));
        assert!(!AwaitingStart.can_transition(AwaitingStart));
        assert!(!Active.can_transition(AwaitingStart));
    }
}
