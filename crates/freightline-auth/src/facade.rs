//! Read-side facade over the store's state.
//!
//! A snapshot is a point-in-time copy: cheap to take, safe to hold across
//! awaits, and every derived accessor recomputes from the canonical
//! `derive` module on each call. The facade holds no state of its own
//! beyond the copied record.

use crate::derive::{self, AuthStage, AuthStep, Company};
use crate::state::{AuthState, AuthUser};

#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    state: AuthState,
}

impl AuthSnapshot {
    pub fn new(state: AuthState) -> Self {
        Self { state }
    }

    // ─── Raw state ──────────────────────────────────────────────────

    pub fn user(&self) -> Option<&AuthUser> {
        self.state.user.as_ref()
    }

    pub fn session(&self) -> Option<&freightline_provider::ProviderSession> {
        self.state.session.as_ref()
    }

    /// True until the first auth-change lands.
    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn is_email_verified(&self) -> bool {
        self.state.is_email_verified
    }

    pub fn is_onboarding_complete(&self) -> bool {
        self.state.is_onboarding_complete
    }

    pub fn is_signing_in(&self) -> bool {
        self.state.signing_in
    }

    pub fn is_signing_up(&self) -> bool {
        self.state.signing_up
    }

    pub fn is_signing_out(&self) -> bool {
        self.state.signing_out
    }

    pub fn is_updating_profile(&self) -> bool {
        self.state.updating_profile
    }

    // ─── Derived ────────────────────────────────────────────────────

    /// Authenticated, verified, and onboarded.
    pub fn is_user_ready(&self) -> bool {
        self.state.is_authenticated
            && self.state.is_email_verified
            && self.state.is_onboarding_complete
    }

    /// Initial load or any operation in flight.
    pub fn is_busy(&self) -> bool {
        self.state.loading || self.state.any_op_active()
    }

    pub fn stage(&self) -> AuthStage {
        derive::stage(self.user())
    }

    pub fn step(&self) -> AuthStep {
        derive::step(self.user())
    }

    pub fn display_name(&self) -> String {
        derive::display_name(self.user())
    }

    pub fn initials(&self) -> String {
        derive::initials(self.user())
    }

    pub fn full_name(&self) -> Option<String> {
        self.user().and_then(derive::full_name)
    }

    pub fn role(&self) -> &str {
        self.user().map(derive::role).unwrap_or("user")
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        derive::has_permission(self.user(), permission)
    }

    pub fn company(&self) -> Company {
        self.user().map(derive::company).unwrap_or_default()
    }

    pub fn has_company(&self) -> bool {
        derive::has_company(self.user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use freightline_provider::MetadataMap;

    fn snapshot(user: Option<AuthUser>) -> AuthSnapshot {
        let mut state = AuthState::default();
        state.loading = false;
        state.is_authenticated = user.is_some();
        state.is_email_verified = derive::is_email_verified(user.as_ref());
        state.is_onboarding_complete = derive::is_onboarding_complete(user.as_ref());
        state.user = user;
        AuthSnapshot::new(state)
    }

    fn ready_user() -> AuthUser {
        let mut metadata = MetadataMap::new();
        metadata.insert("onboarding_completed".into(), serde_json::json!(true));
        metadata.insert("full_name".into(), serde_json::json!("Ana Díaz"));
        AuthUser {
            id: "u1".into(),
            email: Some("ana@acme.co".into()),
            phone: None,
            email_confirmed_at: Some(Utc::now()),
            last_sign_in_at: None,
            created_at: None,
            app_metadata: MetadataMap::new(),
            metadata,
        }
    }

    #[test]
    fn ready_iff_all_three_flags() {
        let snap = snapshot(Some(ready_user()));
        assert!(snap.is_user_ready());
        assert_eq!(
            snap.is_user_ready(),
            snap.is_authenticated() && snap.is_email_verified() && snap.is_onboarding_complete()
        );

        let mut user = ready_user();
        user.email_confirmed_at = None;
        let snap = snapshot(Some(user));
        assert!(!snap.is_user_ready());
    }

    #[test]
    fn busy_when_loading_or_operating() {
        let mut state = AuthState::default();
        assert!(AuthSnapshot::new(state.clone()).is_busy());

        state.loading = false;
        assert!(!AuthSnapshot::new(state.clone()).is_busy());

        state.updating_profile = true;
        assert!(AuthSnapshot::new(state).is_busy());
    }

    #[test]
    fn derived_accessors_delegate() {
        let snap = snapshot(Some(ready_user()));
        assert_eq!(snap.stage(), AuthStage::Ready);
        assert_eq!(snap.step().as_str(), "complete");
        assert_eq!(snap.display_name(), "Ana Díaz");
        assert_eq!(snap.initials(), "AD");
        assert_eq!(snap.role(), "user");
        assert!(snap.has_permission("view_dashboard"));
        assert!(!snap.has_permission("manage_fleet"));
    }

    #[test]
    fn anonymous_snapshot() {
        let snap = snapshot(None);
        assert_eq!(snap.stage(), AuthStage::Unauthenticated);
        assert_eq!(snap.step().as_str(), "signin");
        assert_eq!(snap.display_name(), derive::DISPLAY_NAME_FALLBACK);
        assert_eq!(snap.initials(), "?");
        assert!(!snap.has_permission("view_dashboard"));
        assert!(!snap.has_company());
    }
}
