//! # freightline-auth
//!
//! Client-side authentication core for Freightline: the session store, the
//! derived onboarding stages, error normalization, and local persistence.
//!
//! The store is explicitly constructed and dependency-injected; there is
//! no ambient global. A shell builds its collaborators once at startup,
//! initializes the store, and passes it down:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use freightline_auth::{AuthOptions, AuthStore, persist::FileStorage};
//! use freightline_provider::{ProviderClient, ProviderOptions};
//!
//! # async fn example() {
//! let provider = Arc::new(ProviderClient::new(ProviderOptions::from_env()));
//! let objects = Arc::new(provider.storage());
//! let store = Arc::new(AuthStore::new(
//!     provider,
//!     objects,
//!     Arc::new(FileStorage::new()),
//!     AuthOptions::default(),
//! ));
//! store.initialize().await;
//!
//! let snapshot = store.snapshot().await;
//! if snapshot.is_user_ready() {
//!     // straight to the dashboard
//! }
//! # }
//! ```

pub mod derive;
pub mod error;
pub mod facade;
pub mod messages;
pub mod persist;
pub mod state;
pub mod store;
pub mod validate;

pub use derive::{AuthStage, AuthStep, Company};
pub use error::{normalize, AuthError, AuthErrorKind};
pub use facade::AuthSnapshot;
pub use messages::Locale;
pub use state::{AuthState, AuthUser};
pub use store::{AuthStore, SignInParams, SignUpParams, UpdateProfileParams};

/// Store-level configuration.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Origin the product is served from; used to build redirect URLs the
    /// provider embeds in emails and OAuth flows.
    pub site_url: String,

    /// Language for user-facing messages.
    pub locale: Locale,

    /// Bucket avatars are uploaded into.
    pub avatar_bucket: String,

    /// Path (under `site_url`) the reset-password email links back to.
    pub reset_password_path: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            locale: Locale::default(),
            avatar_bucket: "avatars".to_string(),
            reset_password_path: "/auth/reset-password".to_string(),
        }
    }
}

impl AuthOptions {
    /// Read the site URL from `FREIGHTLINE_SITE_URL`, keeping defaults for
    /// the rest.
    pub fn from_env() -> Self {
        Self {
            site_url: std::env::var("FREIGHTLINE_SITE_URL").unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let opts = AuthOptions::default();
        assert_eq!(opts.avatar_bucket, "avatars");
        assert_eq!(opts.reset_password_path, "/auth/reset-password");
        assert_eq!(opts.locale, Locale::Es);
    }
}
