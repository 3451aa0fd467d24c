//! Blob storage client for user assets.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::ObjectStorage;
use crate::error::{extract_error_message, ProviderError};
use crate::types::ProviderSession;

/// Storage client bound to the provider's object API.
///
/// Obtained from [`crate::ProviderClient::storage`]; shares the parent's
/// HTTP pool and token bundle so uploads carry the signed-in user's
/// credentials.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    storage_url: String,
    session: Arc<RwLock<Option<ProviderSession>>>,
}

impl StorageClient {
    pub(crate) fn new(
        http: reqwest::Client,
        storage_url: String,
        session: Arc<RwLock<Option<ProviderSession>>>,
    ) -> Self {
        Self {
            http,
            storage_url,
            session,
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/object/{bucket}/{}",
            self.storage_url,
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ProviderError> {
        let token = {
            let guard = self.session.read().await;
            guard
                .as_ref()
                .map(|s| s.access_token.clone())
                .ok_or(ProviderError::NoSession)?
        };

        let mut req = self
            .http
            .post(self.object_url(bucket, key))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if upsert {
            req = req.header("x-upsert", "true");
        }

        let resp = req.send().await.map_err(ProviderError::network)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let (code, message) = extract_error_message(&body);
        Err(ProviderError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/object/public/{bucket}/{}",
            self.storage_url,
            urlencoding::encode(key)
        )
    }
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("storage_url", &self.storage_url)
            .finish()
    }
}
