//! Core auth state: the internal user shape and the store's state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freightline_provider::{MetadataMap, ProviderSession, ProviderUser};

/// The authenticated principal as the rest of the product sees it.
///
/// Unlike the provider's wire shape, `metadata` is never absent here. An
/// identity without metadata carries an empty map, so downstream
/// derivations only ever null-check individual keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Set by the provider once the address is confirmed; presence means
    /// verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: MetadataMap,
    #[serde(default)]
    pub metadata: MetadataMap,
}

impl AuthUser {
    /// Convert the provider's user record, defaulting both metadata maps.
    pub fn from_provider(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone: user.phone,
            email_confirmed_at: user.email_confirmed_at,
            last_sign_in_at: user.last_sign_in_at,
            created_at: user.created_at,
            app_metadata: user.app_metadata.unwrap_or_default(),
            metadata: user.user_metadata.unwrap_or_default(),
        }
    }

    /// String-valued metadata key, if present and non-empty.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Boolean metadata key; anything but `true` reads as false.
    pub fn meta_flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Which in-flight operation a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    SignIn,
    SignUp,
    SignOut,
    UpdateProfile,
}

/// Everything the session store owns.
///
/// `user`, `session`, and the three `is_*` status flags are written only by
/// the auth-change handler; operation flags and the error slot are written
/// by the individual mutators.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub session: Option<ProviderSession>,
    /// True until the first auth-change lands (from initialization or a
    /// pushed event); false permanently afterwards.
    pub loading: bool,

    pub is_authenticated: bool,
    pub is_email_verified: bool,
    pub is_onboarding_complete: bool,

    /// The one currently visible error message. Overwritten by every new
    /// attempt, never queued.
    pub error: Option<String>,

    pub signing_in: bool,
    pub signing_up: bool,
    pub signing_out: bool,
    pub updating_profile: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            loading: true,
            is_authenticated: false,
            is_email_verified: false,
            is_onboarding_complete: false,
            error: None,
            signing_in: false,
            signing_up: false,
            signing_out: false,
            updating_profile: false,
        }
    }
}

impl AuthState {
    pub fn set_op(&mut self, op: Op, active: bool) {
        match op {
            Op::SignIn => self.signing_in = active,
            Op::SignUp => self.signing_up = active,
            Op::SignOut => self.signing_out = active,
            Op::UpdateProfile => self.updating_profile = active,
        }
    }

    /// Whether any mutator is currently in flight.
    pub fn any_op_active(&self) -> bool {
        self.signing_in || self.signing_up || self.signing_out || self.updating_profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_user(metadata: Option<MetadataMap>) -> ProviderUser {
        ProviderUser {
            id: "u1".into(),
            aud: Some("authenticated".into()),
            role: Some("authenticated".into()),
            email: Some("ana@acme.co".into()),
            email_confirmed_at: None,
            phone: None,
            confirmed_at: None,
            last_sign_in_at: None,
            app_metadata: None,
            user_metadata: metadata,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn metadata_defaults_to_empty_map() {
        let user = AuthUser::from_provider(provider_user(None));
        assert!(user.metadata.is_empty());
        assert!(user.app_metadata.is_empty());
    }

    #[test]
    fn meta_accessors() {
        let mut map = MetadataMap::new();
        map.insert("full_name".into(), serde_json::json!("Ana Díaz"));
        map.insert("onboarding_completed".into(), serde_json::json!(true));
        map.insert("company_id".into(), serde_json::json!(""));
        let user = AuthUser::from_provider(provider_user(Some(map)));

        assert_eq!(user.meta_str("full_name"), Some("Ana Díaz"));
        assert!(user.meta_flag("onboarding_completed"));
        // empty strings read as absent
        assert_eq!(user.meta_str("company_id"), None);
        assert!(!user.meta_flag("marketing_consent"));
    }

    #[test]
    fn initial_state_is_loading() {
        let state = AuthState::default();
        assert!(state.loading);
        assert!(state.user.is_none());
        assert!(!state.any_op_active());
        assert!(state.error.is_none());
    }

    #[test]
    fn op_flags_are_independent() {
        let mut state = AuthState::default();
        state.set_op(Op::SignIn, true);
        state.set_op(Op::UpdateProfile, true);
        assert!(state.signing_in);
        assert!(state.updating_profile);
        assert!(!state.signing_up);
        state.set_op(Op::SignIn, false);
        assert!(state.any_op_active());
        state.set_op(Op::UpdateProfile, false);
        assert!(!state.any_op_active());
    }
}
