//! Error normalization.
//!
//! Provider failures arrive as loosely structured messages; this module
//! reduces them to a closed taxonomy with a localized user-facing message.
//! The original provider text survives only as `detail`, which is logged
//! for support and never displayed.

use serde::{Deserialize, Serialize};

use freightline_provider::ProviderError;

use crate::messages::{self, Locale};

/// The closed set of auth error kinds the product distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorKind {
    InvalidCredentials,
    EmailNotVerified,
    UserNotFound,
    EmailAlreadyExists,
    WeakPassword,
    NetworkError,
    NotAuthenticated,
    Unknown,
}

impl AuthErrorKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::NetworkError => "NETWORK_ERROR",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// A normalized auth failure: taxonomy kind, localized message, raw detail.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", .kind.as_code())]
pub struct AuthError {
    pub kind: AuthErrorKind,
    /// Localized, user-facing.
    pub message: String,
    /// Raw provider message; diagnostic only.
    pub detail: Option<String>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, locale: Locale) -> Self {
        Self {
            kind,
            message: messages::error_message(locale, kind).to_string(),
            detail: None,
        }
    }

    pub fn with_message(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_authenticated(locale: Locale) -> Self {
        Self::new(AuthErrorKind::NotAuthenticated, locale)
    }
}

/// Substring matches against provider messages, probed in order. Unmatched
/// messages fall through to [`AuthErrorKind::Unknown`].
const PROVIDER_MESSAGE_TABLE: &[(&str, AuthErrorKind)] = &[
    ("Invalid login credentials", AuthErrorKind::InvalidCredentials),
    ("Email not confirmed", AuthErrorKind::EmailNotVerified),
    ("User not found", AuthErrorKind::UserNotFound),
    ("User already registered", AuthErrorKind::EmailAlreadyExists),
    ("Password should be at least", AuthErrorKind::WeakPassword),
    ("Unable to validate email", AuthErrorKind::EmailNotVerified),
];

/// Reduce a provider failure to the closed taxonomy.
pub fn normalize(err: &ProviderError, locale: Locale) -> AuthError {
    let raw = err.message();

    let kind = if err.is_network() {
        AuthErrorKind::NetworkError
    } else if matches!(err, ProviderError::NoSession) {
        AuthErrorKind::NotAuthenticated
    } else {
        PROVIDER_MESSAGE_TABLE
            .iter()
            .find(|(needle, _)| raw.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(AuthErrorKind::Unknown)
    };

    AuthError {
        kind,
        message: messages::error_message(locale, kind).to_string(),
        detail: Some(raw),
    }
}
