//! # freightline-provider
//!
//! Typed async boundary to the hosted identity/storage service the product
//! delegates authentication to. The rest of the codebase never speaks HTTP
//! to the provider directly; it goes through [`ProviderClient`] (or, in
//! tests, any other [`IdentityApi`] implementation).
//!
//! The client owns the current token bundle and announces every identity
//! change on its [`AuthEvents`] queue; consumers treat those pushes, not
//! operation return values, as the authoritative signal for "who is
//! signed in".
//!
//! ## Usage
//!
//! ```rust,no_run
//! use freightline_provider::{IdentityApi, ProviderClient, ProviderOptions};
//!
//! # async fn example() -> Result<(), freightline_provider::ProviderError> {
//! let provider = ProviderClient::new(ProviderOptions {
//!     base_url: "https://project.example.co".into(),
//!     anon_key: "public-anon-key".into(),
//!     ..Default::default()
//! });
//!
//! let session = provider
//!     .sign_in_with_password("user@example.com", "secret")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod error;
mod events;
mod storage;
mod types;

pub use api::*;
pub use error::*;
pub use events::*;
pub use storage::*;
pub use types::*;

use error::extract_error_message;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

// ─── Options ────────────────────────────────────────────────────────

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Project base URL (e.g. `https://project.example.co`).
    pub base_url: String,

    /// Publishable API key sent with every request.
    pub anon_key: String,

    /// HTTP request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ProviderOptions {
    /// Read options from `FREIGHTLINE_PROVIDER_URL` /
    /// `FREIGHTLINE_PROVIDER_KEY`. Missing variables become empty strings;
    /// the caller decides whether that is fatal.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("FREIGHTLINE_PROVIDER_URL").unwrap_or_default(),
            anon_key: std::env::var("FREIGHTLINE_PROVIDER_KEY").unwrap_or_default(),
            ..Default::default()
        }
    }
}

// ─── Client ─────────────────────────────────────────────────────────

/// HTTP client for the identity provider.
///
/// Cheap to clone; all clones share the same HTTP pool, token bundle, and
/// event queue.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    auth_url: String,
    storage_url: String,
    options: ProviderOptions,
    session: Arc<RwLock<Option<ProviderSession>>>,
    events: Arc<AuthEvents>,
}

impl ProviderClient {
    pub fn new(options: ProviderOptions) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Ok(val) = reqwest::header::HeaderValue::from_str(&options.anon_key) {
            headers.insert("apikey", val);
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(options.timeout_secs))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base = options.base_url.trim_end_matches('/');
        Self {
            http,
            auth_url: format!("{base}/auth/v1"),
            storage_url: format!("{base}/storage/v1"),
            options,
            session: Arc::new(RwLock::new(None)),
            events: Arc::new(AuthEvents::new()),
        }
    }

    /// The options this client was created with.
    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Base URL for auth endpoints.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// The token bundle currently held by the client, if any.
    pub async fn current_session(&self) -> Option<ProviderSession> {
        self.session.read().await.clone()
    }

    /// Storage client sharing this client's HTTP pool and token bundle.
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            self.http.clone(),
            self.storage_url.clone(),
            self.session.clone(),
        )
    }

    // ─── Internal helpers ───────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.auth_url, path)
    }

    /// Bearer token for user-scoped endpoints: the session token when
    /// signed in, the publishable key otherwise.
    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(s) => s.access_token.clone(),
            None => self.options.anon_key.clone(),
        }
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ProviderError> {
        let resp = self
            .http
            .post(self.url(path))
            .query(query)
            .bearer_auth(self.bearer().await)
            .json(body)
            .send()
            .await
            .map_err(ProviderError::network)?;
        Self::handle_response(resp).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ProviderError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ProviderError::network)?;
        Self::handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let resp = self
            .http
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(ProviderError::network)?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = resp.status();
        let body = resp.text().await.map_err(ProviderError::network)?;

        if status.is_success() {
            let text = if body.is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(text).map_err(|e| {
                ProviderError::Deserialization(format!("unexpected response shape: {e}"))
            })
        } else {
            let (code, message) = extract_error_message(&body);
            Err(ProviderError::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }

    async fn set_session(&self, session: Option<ProviderSession>) {
        *self.session.write().await = session;
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

#[async_trait]
impl IdentityApi for ProviderClient {
    async fn sign_up(&self, body: SignUpBody) -> Result<AuthData, ProviderError> {
        // The signup endpoint answers with a bare user when confirmation is
        // pending, and with a full token bundle when it is not.
        let value: serde_json::Value = self.post_json("/signup", &[], &body).await?;
        let data = if value.get("access_token").is_some() {
            let session: ProviderSession = serde_json::from_value(value)
                .map_err(|e| ProviderError::Deserialization(e.to_string()))?;
            AuthData {
                user: Some(session.user.clone()),
                session: Some(session),
            }
        } else {
            let user: ProviderUser = serde_json::from_value(value)
                .map_err(|e| ProviderError::Deserialization(e.to_string()))?;
            AuthData {
                user: Some(user),
                session: None,
            }
        };

        if let Some(ref session) = data.session {
            self.set_session(Some(session.clone())).await;
            self.events
                .emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        }
        Ok(data)
    }

    async fn sign_in_with_otp(&self, body: OtpBody) -> Result<(), ProviderError> {
        let _: serde_json::Value = self.post_json("/otp", &[], &body).await?;
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let body = PasswordGrantBody {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: ProviderSession = self
            .post_json("/token", &[("grant_type", "password")], &body)
            .await?;
        self.set_session(Some(session.clone())).await;
        self.events
            .emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    fn authorize_url(&self, params: OAuthParams) -> Result<String, ProviderError> {
        let mut url = url::Url::parse(&format!("{}/authorize", self.auth_url))
            .map_err(|e| ProviderError::Deserialization(format!("bad authorize url: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("provider", params.provider.as_str());
            if let Some(ref redirect) = params.redirect_to {
                pairs.append_pair("redirect_to", redirect);
            }
            for (key, value) in &params.query_params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let token = {
            let guard = self.session.read().await;
            guard.as_ref().map(|s| s.access_token.clone())
        };

        // Revoking twice is harmless; without a token there is nothing to
        // revoke remotely but the signed-out notification still goes out.
        if let Some(token) = token {
            let resp = self
                .http
                .post(self.url("/logout"))
                .bearer_auth(&token)
                .send()
                .await
                .map_err(ProviderError::network)?;
            if !resp.status().is_success() && resp.status().as_u16() != 401 {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                let (code, message) = extract_error_message(&body);
                return Err(ProviderError::Api {
                    status,
                    code,
                    message,
                });
            }
        }

        self.set_session(None).await;
        self.events.emit(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn update_user(&self, attrs: UserAttributes) -> Result<ProviderUser, ProviderError> {
        let token = {
            let guard = self.session.read().await;
            guard
                .as_ref()
                .map(|s| s.access_token.clone())
                .ok_or(ProviderError::NoSession)?
        };

        let user: ProviderUser = self.put_json("/user", &token, &attrs).await?;

        let updated = {
            let mut guard = self.session.write().await;
            if let Some(ref mut session) = *guard {
                session.user = user.clone();
            }
            guard.clone()
        };
        self.events.emit(AuthChangeEvent::UserUpdated, updated);
        Ok(user)
    }

    async fn restore_session(
        &self,
        session: ProviderSession,
    ) -> Result<ProviderSession, ProviderError> {
        let user: ProviderUser = self.get_json("/user", &session.access_token).await?;
        let restored = ProviderSession { user, ..session };
        self.set_session(Some(restored.clone())).await;
        Ok(restored)
    }

    async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ProviderError> {
        let body = RecoverBody {
            email: email.to_string(),
        };
        let query: Vec<(&str, &str)> = match redirect_to {
            Some(url) => vec![("redirect_to", url)],
            None => Vec::new(),
        };
        let _: serde_json::Value = self.post_json("/recover", &query, &body).await?;
        Ok(())
    }

    async fn resend_signup(&self, email: &str) -> Result<(), ProviderError> {
        let body = ResendBody {
            kind: "signup".into(),
            email: email.to_string(),
        };
        let _: serde_json::Value = self.post_json("/resend", &[], &body).await?;
        Ok(())
    }

    fn events(&self) -> &AuthEvents {
        &self.events
    }
}
