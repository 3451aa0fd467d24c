//! Wire types for the identity provider.
//!
//! Field names follow the provider's JSON contract (snake_case). Optional
//! fields are skipped on serialization so request bodies stay minimal.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arbitrary user metadata carried by the provider's user record.
pub type MetadataMap = BTreeMap<String, serde_json::Value>;

// ─── User & Session ─────────────────────────────────────────────────

/// The provider's user record as it appears on the wire.
///
/// `user_metadata` is optional here because the provider may omit it for
/// brand-new identities; consumers default it before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<MetadataMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<MetadataMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Token bundle issued by the provider. Replaced wholesale on every
/// refresh or sign-out; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Absolute expiry, epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: ProviderUser,
}

impl ProviderSession {
    /// Whether the access token's absolute expiry has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => at <= now.timestamp(),
            None => false,
        }
    }
}

/// `{user, session}` pair returned by registration. A password sign-up
/// with confirmation enabled yields a user but no session yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ProviderUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ProviderSession>,
}

// ─── Requests ───────────────────────────────────────────────────────

/// Body for `POST /signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "MetadataMap::is_empty")]
    pub data: MetadataMap,
}

/// Body for `POST /otp` (one-time-link registration / sign-in).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpBody {
    pub email: String,
    /// When true, an unknown address registers a fresh identity instead of
    /// failing.
    pub create_user: bool,
    #[serde(default, skip_serializing_if = "MetadataMap::is_empty")]
    pub data: MetadataMap,
}

/// Body for `POST /token?grant_type=password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGrantBody {
    pub email: String,
    pub password: String,
}

/// Partial update for `PUT /user`. Absent fields are left untouched;
/// `data` is merged key-by-key by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "MetadataMap::is_empty")]
    pub data: MetadataMap,
}

/// Body for `POST /recover` (password reset email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverBody {
    pub email: String,
}

/// Body for `POST /resend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendBody {
    /// Which confirmation to resend; registration confirmations use
    /// `"signup"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub email: String,
}

// ─── OAuth ──────────────────────────────────────────────────────────

/// Redirect-flow OAuth providers the product ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Azure,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
            Self::Azure => "azure",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for building an `/authorize` redirect URL.
#[derive(Debug, Clone)]
pub struct OAuthParams {
    pub provider: OAuthProvider,
    /// Where the provider sends the browser after the consent screen.
    pub redirect_to: Option<String>,
    /// Extra query parameters forwarded to the upstream provider
    /// (offline access, consent prompt, …).
    pub query_params: Vec<(String, String)>,
}

impl OAuthParams {
    pub fn new(provider: OAuthProvider) -> Self {
        Self {
            provider,
            redirect_to: None,
            query_params: Vec::new(),
        }
    }

    pub fn redirect_to(mut self, url: impl Into<String>) -> Self {
        self.redirect_to = Some(url.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry() {
        let user = ProviderUser {
            id: "u1".into(),
            aud: None,
            role: None,
            email: Some("a@b.co".into()),
            email_confirmed_at: None,
            phone: None,
            confirmed_at: None,
            last_sign_in_at: None,
            app_metadata: None,
            user_metadata: None,
            created_at: None,
            updated_at: None,
        };
        let mut session = ProviderSession {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            expires_in: Some(3600),
            expires_at: Some(1_000),
            refresh_token: None,
            user,
        };
        let now = DateTime::from_timestamp(2_000, 0).unwrap();
        assert!(session.is_expired(now));
        session.expires_at = Some(3_000);
        assert!(!session.is_expired(now));
        session.expires_at = None;
        assert!(!session.is_expired(now));
    }

    #[test]
    fn signup_body_omits_empty_metadata() {
        let body = SignUpBody {
            email: "a@b.co".into(),
            password: "secret".into(),
            data: MetadataMap::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn resend_body_uses_type_key() {
        let body = ResendBody {
            kind: "signup".into(),
            email: "a@b.co".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "signup");
    }

    #[test]
    fn provider_user_tolerates_missing_metadata() {
        let user: ProviderUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "a@b.co"
        }))
        .unwrap();
        assert!(user.user_metadata.is_none());
        assert!(user.email_confirmed_at.is_none());
    }

    #[test]
    fn oauth_params_builder() {
        let params = OAuthParams::new(OAuthProvider::Google)
            .redirect_to("https://app.example.com/auth/welcome")
            .query_param("access_type", "offline");
        assert_eq!(params.provider.as_str(), "google");
        assert_eq!(params.query_params.len(), 1);
    }
}
