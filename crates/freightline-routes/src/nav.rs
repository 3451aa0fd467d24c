//! Navigation directives.
//!
//! Guards and the action orchestrator describe navigation as data; the
//! embedding shell is the only thing that actually moves the user.

use serde::{Deserialize, Serialize};

/// State carried along a navigation, the way a router passes location
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    /// The path the user originally asked for (captured by the protected
    /// guard so sign-in can return there).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Email to prefill/display on the target screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// One-off message to show on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NavState {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.email.is_none() && self.message.is_none()
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            from: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Where to go after a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Navigate, keeping the current entry in history.
    Push { to: String, state: NavState },
    /// Navigate, replacing the current entry.
    Replace { to: String, state: NavState },
    /// Leave the app entirely (OAuth consent screens).
    External { url: String },
    /// No navigation required.
    Stay,
}

impl Navigation {
    pub fn push(to: impl Into<String>, state: NavState) -> Self {
        Self::Push {
            to: to.into(),
            state,
        }
    }

    pub fn replace(to: impl Into<String>, state: NavState) -> Self {
        Self::Replace {
            to: to.into(),
            state,
        }
    }

    /// The in-app target path, if this directive has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Push { to, .. } | Self::Replace { to, .. } => Some(to),
            Self::External { .. } | Self::Stay => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_state_builders() {
        assert!(NavState::default().is_empty());
        let s = NavState::from_path("/fleet");
        assert_eq!(s.from.as_deref(), Some("/fleet"));
        assert!(!s.is_empty());
    }

    #[test]
    fn navigation_target() {
        assert_eq!(
            Navigation::push("/dashboard", NavState::default()).target(),
            Some("/dashboard")
        );
        assert_eq!(
            Navigation::External {
                url: "https://x".into()
            }
            .target(),
            None
        );
        assert_eq!(Navigation::Stay.target(), None);
    }
}
