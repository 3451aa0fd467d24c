//! Provider error shape.
//!
//! Every failure that crosses the provider boundary is reduced to one of
//! these variants. Callers upstream match on the message/status to decide
//! what to show the user; nothing here is user-facing text.

/// Errors returned by the identity/storage provider boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure (DNS, connection refused, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider error ({status}): {message}")]
    Api {
        status: u16,
        /// Machine-readable code, when the provider includes one.
        code: Option<String>,
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A request was attempted without a live session where one is required.
    #[error("no active session")]
    NoSession,
}

impl ProviderError {
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// The raw provider message, regardless of variant.
    pub fn message(&self) -> String {
        match self {
            Self::Network(msg) => msg.clone(),
            Self::Api { message, .. } => message.clone(),
            Self::Deserialization(msg) => msg.clone(),
            Self::NoSession => "no active session".to_string(),
        }
    }

    /// HTTP status, when the provider produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Error body shapes the provider is known to emit. The fields are probed
/// in order; the first present one wins.
pub(crate) fn extract_error_message(body: &str) -> (Option<String>, String) {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let Some(v) = parsed else {
        return (None, body.to_string());
    };

    let code = v
        .get("error_code")
        .or_else(|| v.get("code"))
        .and_then(|c| {
            c.as_str()
                .map(|s| s.to_string())
                .or_else(|| c.as_i64().map(|n| n.to_string()))
        });

    let message = v
        .get("msg")
        .or_else(|| v.get("message"))
        .or_else(|| v.get("error_description"))
        .or_else(|| v.get("error"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| body.to_string());

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_msg_field() {
        let (code, msg) = extract_error_message(r#"{"code":400,"msg":"Invalid login credentials"}"#);
        assert_eq!(code.as_deref(), Some("400"));
        assert_eq!(msg, "Invalid login credentials");
    }

    #[test]
    fn extracts_error_description() {
        let (_, msg) =
            extract_error_message(r#"{"error":"invalid_grant","error_description":"Bad creds"}"#);
        assert_eq!(msg, "Bad creds");
    }

    #[test]
    fn falls_back_to_raw_body() {
        let (code, msg) = extract_error_message("upstream exploded");
        assert!(code.is_none());
        assert_eq!(msg, "upstream exploded");
    }

    #[test]
    fn message_accessor_covers_variants() {
        let err = ProviderError::Api {
            status: 422,
            code: None,
            message: "User already registered".into(),
        };
        assert_eq!(err.message(), "User already registered");
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_network());
        assert!(ProviderError::Network("refused".into()).is_network());
    }
}
