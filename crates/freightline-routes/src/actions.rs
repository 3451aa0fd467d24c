//! Post-condition navigation for auth actions.
//!
//! Each store mutator is wrapped with its fixed "where to next" rule. On
//! success the wrapper returns a [`Navigation`] directive; on failure it
//! returns the error untouched and never navigates; showing the error is
//! the caller's job.

use std::sync::Arc;

use freightline_auth::derive::ONBOARDING_COMPLETED_KEY;
use freightline_auth::store::{SignInParams, SignUpParams, UpdateProfileParams};
use freightline_auth::{messages, AuthError, AuthStore};
use freightline_provider::OAuthProvider;

use crate::nav::{NavState, Navigation};
use crate::routes::paths;

pub struct AuthActions {
    store: Arc<AuthStore>,
}

impl AuthActions {
    pub fn new(store: Arc<AuthStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    /// Register, then move to the verify-email screen carrying the
    /// submitted address. Applies to both password and link-based sign-up.
    pub async fn sign_up(&self, params: SignUpParams) -> Result<Navigation, AuthError> {
        let email = params.email.clone();
        self.store.sign_up(params).await?;
        Ok(Navigation::push(
            paths::VERIFY_EMAIL,
            NavState::with_email(email),
        ))
    }

    /// Sign in, then return to the captured URL if one exists, else to the
    /// dashboard. An explicit `returnUrl` query parameter wins over the
    /// stored slot, and the slot is cleared either way.
    pub async fn sign_in(
        &self,
        params: SignInParams,
        return_url: Option<&str>,
    ) -> Result<Navigation, AuthError> {
        self.store.sign_in(params).await?;
        Ok(Navigation::replace(
            self.resolve_return_url(return_url),
            NavState::default(),
        ))
    }

    /// Start the OAuth consent flow for an existing-account sign-in. The
    /// directive is external: origin plus the post-login target.
    pub async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        return_url: Option<&str>,
    ) -> Result<Navigation, AuthError> {
        let target = self.resolve_return_url(return_url);
        let redirect = self.absolute_url(&target);
        let url = self.store.sign_in_with_oauth(provider, &redirect).await?;
        Ok(Navigation::External { url })
    }

    /// OAuth registration lands on the onboarding welcome screen.
    pub async fn sign_up_with_oauth(
        &self,
        provider: OAuthProvider,
    ) -> Result<Navigation, AuthError> {
        let redirect = self.absolute_url(paths::WELCOME);
        let url = self.store.sign_in_with_oauth(provider, &redirect).await?;
        Ok(Navigation::External { url })
    }

    pub async fn sign_out(&self) -> Result<Navigation, AuthError> {
        self.store.sign_out().await?;
        Ok(Navigation::replace(paths::HOME, NavState::default()))
    }

    /// Update the profile; completing onboarding moves on to company
    /// setup, any other patch stays put.
    pub async fn update_profile(
        &self,
        params: UpdateProfileParams,
    ) -> Result<Navigation, AuthError> {
        let completes_onboarding = params
            .metadata
            .get(ONBOARDING_COMPLETED_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        self.store.update_profile(params).await?;

        if completes_onboarding {
            Ok(Navigation::push(paths::COMPANY_SETUP, NavState::default()))
        } else {
            Ok(Navigation::Stay)
        }
    }

    /// No navigation on avatar upload; the screen stays where it is.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AuthError> {
        self.store.upload_avatar(file_name, bytes, content_type).await
    }

    pub async fn resend_verification(&self) -> Result<(), AuthError> {
        self.store.resend_verification().await
    }

    /// Request the reset email, then land on the login screen with a
    /// confirmation message.
    pub async fn reset_password(&self, email: &str) -> Result<Navigation, AuthError> {
        self.store.reset_password(email).await?;
        let locale = self.store.options().locale;
        Ok(Navigation::push(
            paths::LOGIN,
            NavState::with_message(messages::reset_link_sent(locale)),
        ))
    }

    /// Capture where to return after the next sign-in.
    pub fn store_return_url(&self, url: &str) {
        self.store.store_return_url(url);
    }

    pub async fn clear_error(&self) {
        self.store.clear_error().await;
    }

    // ─── Internals ──────────────────────────────────────────────────

    /// One-shot resolution: explicit query parameter, else the stored
    /// slot, else the dashboard. The slot is consumed regardless of which
    /// source wins.
    fn resolve_return_url(&self, explicit: Option<&str>) -> String {
        let stored = self.store.take_return_url();
        explicit
            .map(|s| s.to_string())
            .or(stored)
            .unwrap_or_else(|| paths::DASHBOARD.to_string())
    }

    fn absolute_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.store.options().site_url.trim_end_matches('/'),
            path
        )
    }
}

impl std::fmt::Debug for AuthActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthActions").finish()
    }
}
