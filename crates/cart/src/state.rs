//! Cart state machine.

/// The state of the cart engine.
///
/// State transitions:
/// ```text
/// Loading ──► Ready
/// ```
///
/// Mutations are permitted in either state; `Loading` only marks that the
/// initial reconciliation with the remote cart has not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CartState {
    /// Initial load from the remote service or mirror is still pending.
    #[default]
    Loading,

    /// The cart has been loaded and is authoritative for the session.
    Ready,
}

impl CartState {
    /// Returns true if the initial load has not completed.
    pub fn is_loading(&self) -> bool {
        matches!(self, CartState::Loading)
    }

    /// Returns true if the cart has been loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self, CartState::Ready)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CartState::Loading => "Loading",
            CartState::Ready => "Ready",
        }
    }
}

impl std::fmt::Display for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_loading() {
        assert_eq!(CartState::default(), CartState::Loading);
    }

    #[test]
    fn test_predicates() {
        assert!(CartState::Loading.is_loading());
        assert!(!CartState::Loading.is_ready());
        assert!(CartState::Ready.is_ready());
        assert!(!CartState::Ready.is_loading());
    }

    #[test]
    fn test_display() {
        assert_eq!(CartState::Loading.to_string(), "Loading");
        assert_eq!(CartState::Ready.to_string(), "Ready");
    }
}
