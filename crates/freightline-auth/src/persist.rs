//! Local persistence for the session store.
//!
//! Exactly two things are ever persisted: the `{user, session}` record
//! (rewritten on every identity change, read once at startup to prime
//! optimistic state) and the one-shot `auth_redirect_url` slot. Operation
//! flags and errors are never written. All writes are best-effort: a
//! failing disk never breaks an auth flow, it only logs a warning.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use freightline_provider::ProviderSession;

use crate::state::AuthUser;

/// Name of the persisted auth record.
pub const AUTH_RECORD_KEY: &str = "auth-storage";

/// Name of the one-shot post-sign-in redirect slot.
pub const REDIRECT_URL_KEY: &str = "auth_redirect_url";

/// Key/value storage for small local records.
///
/// Implementations swallow their own failures; every operation is
/// best-effort by contract.
pub trait StateStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    /// Drop everything this storage holds.
    fn clear(&self);
}

// ─── File-backed storage ────────────────────────────────────────────

/// Storage backed by one JSON-ish file per key under the user's home
/// directory (`~/.freightline/<key>.json`).
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".freightline");
        Self { dir }
    }

    /// Storage rooted at an explicit directory (tests, portable installs).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.path(key), value))
        {
            tracing::warn!(%key, %err, "failed to persist local record");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path(key);
        if path.exists() {
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::warn!(%key, %err, "failed to remove local record");
            }
        }
    }

    fn clear(&self) {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            if let Err(err) = std::fs::remove_file(entry.path()) {
                tracing::warn!(%err, "failed to clear local record");
            }
        }
    }
}

// ─── In-memory storage ──────────────────────────────────────────────

/// Map-backed storage for tests and ephemeral shells.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.write() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.map.write() {
            map.remove(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut map) = self.map.write() {
            map.clear();
        }
    }
}

// ─── The persisted auth record ──────────────────────────────────────

/// What survives a restart: identity only, never flags or errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ProviderSession>,
}

/// Typed wrapper over a [`StateStorage`] for the two auth records.
#[derive(Clone)]
pub struct AuthPersistence {
    storage: Arc<dyn StateStorage>,
}

impl AuthPersistence {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Option<PersistedAuth> {
        let raw = self.storage.get(AUTH_RECORD_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable persisted auth record");
                None
            }
        }
    }

    /// Serialize-on-change; called by the auth-change handler whenever the
    /// identity fields move. A fully signed-out state removes the record
    /// instead of writing an empty one.
    pub fn save(&self, user: &Option<AuthUser>, session: &Option<ProviderSession>) {
        if user.is_none() && session.is_none() {
            self.storage.remove(AUTH_RECORD_KEY);
            return;
        }
        let record = PersistedAuth {
            user: user.clone(),
            session: session.clone(),
        };
        match serde_json::to_string(&record) {
            Ok(raw) => self.storage.set(AUTH_RECORD_KEY, &raw),
            Err(err) => tracing::warn!(%err, "failed to serialize auth record"),
        }
    }

    /// Wipe everything local. Used on sign-out so a shared device keeps no
    /// stale session material.
    pub fn clear_all(&self) {
        self.storage.clear();
    }

    /// Remember where to send the user after the next sign-in.
    pub fn store_redirect(&self, url: &str) {
        self.storage.set(REDIRECT_URL_KEY, url);
    }

    /// One-shot read of the stored redirect: clears on read.
    pub fn take_redirect(&self) -> Option<String> {
        let url = self.storage.get(REDIRECT_URL_KEY);
        self.storage.remove(REDIRECT_URL_KEY);
        url.filter(|u| !u.is_empty())
    }
}

impl std::fmt::Debug for AuthPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPersistence").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightline_provider::{MetadataMap, ProviderUser};

    fn persistence() -> AuthPersistence {
        AuthPersistence::new(Arc::new(MemoryStorage::new()))
    }

    fn sample_user() -> AuthUser {
        let provider_user = ProviderUser {
            id: "u1".into(),
            aud: None,
            role: None,
            email: Some("ana@acme.co".into()),
            email_confirmed_at: None,
            phone: None,
            confirmed_at: None,
            last_sign_in_at: None,
            app_metadata: None,
            user_metadata: Some({
                let mut m = MetadataMap::new();
                m.insert("full_name".into(), serde_json::json!("Ana Díaz"));
                m
            }),
            created_at: None,
            updated_at: None,
        };
        AuthUser::from_provider(provider_user)
    }

    #[test]
    fn save_load_round_trip_is_verbatim() {
        let p = persistence();
        let user = Some(sample_user());
        p.save(&user, &None);

        let loaded = p.load().unwrap();
        assert_eq!(loaded.user, user);
        assert!(loaded.session.is_none());
    }

    #[test]
    fn load_without_record_is_none() {
        assert!(persistence().load().is_none());
    }

    #[test]
    fn corrupt_record_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(AUTH_RECORD_KEY, "{not json");
        let p = AuthPersistence::new(storage);
        assert!(p.load().is_none());
    }

    #[test]
    fn signed_out_save_removes_the_record() {
        let p = persistence();
        p.save(&Some(sample_user()), &None);
        assert!(p.load().is_some());
        p.save(&None, &None);
        assert!(p.load().is_none());
    }

    #[test]
    fn clear_all_removes_everything() {
        let p = persistence();
        p.save(&Some(sample_user()), &None);
        p.store_redirect("/fleet");
        p.clear_all();
        assert!(p.load().is_none());
        assert!(p.take_redirect().is_none());
    }

    #[test]
    fn redirect_slot_is_one_shot() {
        let p = persistence();
        p.store_redirect("/shipments");
        assert_eq!(p.take_redirect().as_deref(), Some("/shipments"));
        assert!(p.take_redirect().is_none());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "freightline-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let storage = FileStorage::with_dir(&dir);
        storage.set("k", "v");
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k");
        assert!(storage.get("k").is_none());
        storage.set("a", "1");
        storage.set("b", "2");
        storage.clear();
        assert!(storage.get("a").is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
