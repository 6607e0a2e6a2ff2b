/// Page state definitions for tracking crawl progress
///
/// A page is scheduled once, walks the pipeline once, and is persisted once.
use std::fmt;

/// Represents the current state of a page in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page entered the visited set and waits in the worklist
    Scheduled,

    /// Rendered markup was downloaded from the content API
    Fetched,

    /// Site chrome was stripped
    Sanitized,

    /// Assets and links were rewritten to local form
    Rewritten,

    /// The standalone document (head, heading, footer) was built
    Assembled,

    // ===== Terminal States =====
    /// The page file was written
    Persisted,

    /// Fetch, parse or write failed; nothing was written for this page
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Failed)
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// The state that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Scheduled => Some(Self::Fetched),
            Self::Fetched => Some(Self::Sanitized),
            Self::Sanitized => Some(Self::Rewritten),
            Self::Rewritten => Some(Self::Assembled),
            Self::Assembled => Some(Self::Persisted),
            Self::Persisted | Self::Failed => None,
        }
    }

    /// Returns true if moving from this state to `to` is allowed
    ///
    /// Pages advance one step at a time; any active state may fail.
    pub fn can_transition_to(&self, to: Self) -> bool {
        if to == Self::Failed {
            return self.is_active();
        }
        self.next() == Some(to)
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Fetched => "fetched",
            Self::Sanitized => "sanitized",
            Self::Rewritten => "rewritten",
            Self::Assembled => "assembled",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Scheduled,
            Self::Fetched,
            Self::Sanitized,
            Self::Rewritten,
            Self::Assembled,
            Self::Persisted,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!PageState::Scheduled.is_terminal());
        assert!(!PageState::Fetched.is_terminal());
        assert!(!PageState::Sanitized.is_terminal());
        assert!(!PageState::Rewritten.is_terminal());
        assert!(!PageState::Assembled.is_terminal());

        assert!(PageState::Persisted.is_terminal());
        assert!(PageState::Failed.is_terminal());
    }

    #[test]
    fn test_is_success() {
        assert!(PageState::Persisted.is_success());

        assert!(!PageState::Assembled.is_success());
        assert!(!PageState::Failed.is_success());
    }

    #[test]
    fn test_success_path_in_order() {
        let mut state = PageState::Scheduled;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(state.can_transition_to(next));
            state = next;
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                PageState::Scheduled,
                PageState::Fetched,
                PageState::Sanitized,
                PageState::Rewritten,
                PageState::Assembled,
                PageState::Persisted,
            ]
        );
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!PageState::Scheduled.can_transition_to(PageState::Sanitized));
        assert!(!PageState::Rewritten.can_transition_to(PageState::Fetched));
        assert!(!PageState::Persisted.can_transition_to(PageState::Scheduled));
    }

    #[test]
    fn test_failure_only_from_active_states() {
        for state in PageState::all_states() {
            assert_eq!(
                state.can_transition_to(PageState::Failed),
                state.is_active(),
                "unexpected failure transition from {:?}",
                state
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Scheduled), "scheduled");
        assert_eq!(format!("{}", PageState::Persisted), "persisted");
        assert_eq!(format!("{}", PageState::Failed), "failed");
    }

    #[test]
    fn test_all_states_complete() {
        let all = PageState::all_states();
        assert_eq!(all.len(), 7);

        // Verify no duplicates
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j], "Duplicate state found");
            }
        }
    }
}
