//! Seam traits for the provider boundary.
//!
//! The session store depends on these traits, never on the concrete HTTP
//! client, so tests can inject in-memory doubles and assert on call counts.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::events::AuthEvents;
use crate::types::{
    AuthData, OAuthParams, OtpBody, ProviderSession, ProviderUser, SignUpBody, UserAttributes,
};

/// The identity provider: credential registration, sign-in, session
/// restoration, profile updates, and the push event channel.
///
/// Implementations own the current token bundle internally; `update_user`
/// uses it and fails with [`ProviderError::NoSession`] when there is none,
/// while `sign_out` is idempotent (with nothing to revoke it still emits
/// the signed-out notification).
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Password-based registration. With email confirmation enabled the
    /// returned [`AuthData`] carries a user but no session.
    async fn sign_up(&self, body: SignUpBody) -> Result<AuthData, ProviderError>;

    /// Passwordless one-time-link request; registers the address when
    /// `create_user` is set.
    async fn sign_in_with_otp(&self, body: OtpBody) -> Result<(), ProviderError>;

    /// Password grant. Emits a signed-in event on success.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// Build the browser redirect URL for an OAuth consent flow. Purely
    /// local; the session arrives later through the event channel once the
    /// redirect completes.
    fn authorize_url(&self, params: OAuthParams) -> Result<String, ProviderError>;

    /// Revoke the current session. Emits a signed-out event on success.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Partial update of the signed-in user. Emits a user-updated event on
    /// success.
    async fn update_user(&self, attrs: UserAttributes) -> Result<ProviderUser, ProviderError>;

    /// Re-validate a previously issued session against the live service,
    /// returning the bundle with a fresh user record.
    async fn restore_session(
        &self,
        session: ProviderSession,
    ) -> Result<ProviderSession, ProviderError>;

    /// Request a password-reset email. The provider deliberately answers
    /// identically for known and unknown addresses.
    async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ProviderError>;

    /// Resend the registration confirmation email.
    async fn resend_signup(&self, email: &str) -> Result<(), ProviderError>;

    /// The push event channel.
    fn events(&self) -> &AuthEvents;
}

/// Blob storage for user-visible assets (avatars).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an object into a bucket. `upsert` overwrites an existing key.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ProviderError>;

    /// Public URL for an object in a public bucket. Purely local string
    /// construction; does not check that the object exists.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
