/// Phase of one identification loop invocation.
///
/// Exactly one instance is active per loop run; the loop moves through
/// the non-terminal states once per iteration and stops forever at the
/// first terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Capturing,
    Detecting,
    Identifying,
    ResolvingProfile,
    Matched,
    Failed,
    Cancelled,
}

impl LoopState {
    /// Terminal states admit no transition; the loop performs no further
    /// captures or remote calls after entering one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Matched | LoopState::Failed | LoopState::Cancelled
        )
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Capturing => "capturing",
            LoopState::Detecting => "detecting",
            LoopState::Identifying => "identifying",
            LoopState::ResolvingProfile => "resolving-profile",
            LoopState::Matched => "matched",
            LoopState::Failed => "failed",
            LoopState::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LoopState::Idle, false)]
    #[case(LoopState::Capturing, false)]
    #[case(LoopState::Detecting, false)]
    #[case(LoopState::Identifying, false)]
    #[case(LoopState::ResolvingProfile, false)]
    #[case(LoopState::Matched, true)]
    #[case(LoopState::Failed, true)]
    #[case(LoopState::Cancelled, true)]
    fn test_terminality(#[case] state: LoopState, #[case] terminal: bool) {
        assert_eq!(state.is_terminal(), terminal);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(LoopState::ResolvingProfile.to_string(), "resolving-profile");
        assert_eq!(LoopState::Matched.to_string(), "matched");
    }
}
