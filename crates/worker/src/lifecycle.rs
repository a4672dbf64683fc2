//! Worker lifecycle states.
//!
//! ```text
//! Parsed -> Installing -> Installed -> Activating -> Activated
//!               |                          |
//!               v                          (stays Activating if the sweep fails)
//!           Redundant
//! ```

use std::fmt;

/// Where a worker is in its install/activate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Registered but not yet installed.
    Parsed,
    /// Populating the static cache.
    Installing,
    /// Static cache populated; waiting to activate.
    Installed,
    /// Sweeping stale caches.
    Activating,
    /// Controlling pages and intercepting fetches.
    Activated,
    /// Failed to install or replaced by a newer worker. Never intercepts.
    Redundant,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        }
    }

    /// Whether fetches are intercepted in this state.
    pub fn controls_fetches(self) -> bool {
        self == LifecycleState::Activated
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_activated_controls_fetches() {
        let states = [
            LifecycleState::Parsed,
            LifecycleState::Installing,
            LifecycleState::Installed,
            LifecycleState::Activating,
            LifecycleState::Redundant,
        ];
        assert!(states.iter().all(|s| !s.controls_fetches()));
        assert!(LifecycleState::Activated.controls_fetches());
    }

    #[test]
    fn test_display() {
        assert_eq!(LifecycleState::Installed.to_string(), "installed");
        assert_eq!(LifecycleState::Redundant.to_string(), "redundant");
    }
}
