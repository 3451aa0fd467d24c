//! The session store.
//!
//! `AuthStore` is the sole mutable owner of auth state. It is constructed
//! explicitly with its collaborators (identity provider, object storage,
//! local persistence) and has a defined lifecycle: `initialize()` once at
//! startup, `dispose()` on shutdown.
//!
//! Identity fields (`user`, `session`, the derived status flags) are only
//! ever written by [`AuthStore::handle_auth_change`], fed by the provider's
//! single-consumer event queue. Mutators never copy their own results into
//! those fields, so what an operation returned and what the provider later
//! confirmed cannot diverge.
//!
//! Overlapping calls of the same operation are not locked out: the last
//! write to a flag or to the error slot wins. Callers are expected to
//! disable the triggering control while the matching flag is set.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use freightline_provider::{
    AuthChangeEvent, AuthData, IdentityApi, MetadataMap, OAuthParams, OAuthProvider, ObjectStorage,
    OtpBody, ProviderSession, SignUpBody, UserAttributes,
};

use crate::error::{normalize, AuthError, AuthErrorKind};
use crate::messages;
use crate::persist::{AuthPersistence, StateStorage};
use crate::state::{AuthState, AuthUser, Op};
use crate::AuthOptions;
use crate::{derive, facade::AuthSnapshot};

// ─── Operation parameters ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SignUpParams {
    pub email: String,
    /// Absent password requests a passwordless one-time-link registration.
    pub password: Option<String>,
    pub metadata: MetadataMap,
}

impl SignUpParams {
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
            metadata: MetadataMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignInParams {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileParams {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Merged key-by-key into the user's metadata by the provider.
    pub metadata: MetadataMap,
}

// ─── The store ──────────────────────────────────────────────────────

/// Cheap to clone; all clones share the same state, persistence, and
/// event drain.
#[derive(Clone)]
pub struct AuthStore {
    provider: Arc<dyn IdentityApi>,
    objects: Arc<dyn ObjectStorage>,
    persistence: AuthPersistence,
    options: Arc<AuthOptions>,
    state: Arc<RwLock<AuthState>>,
    changed: Arc<watch::Sender<u64>>,
    drain: Arc<StdMutex<Option<JoinHandle<()>>>>,
}

impl AuthStore {
    /// Build a store from its collaborators. Nothing happens until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(
        provider: Arc<dyn IdentityApi>,
        objects: Arc<dyn ObjectStorage>,
        storage: Arc<dyn StateStorage>,
        options: AuthOptions,
    ) -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            provider,
            objects,
            persistence: AuthPersistence::new(storage),
            options: Arc::new(options),
            state: Arc::new(RwLock::new(AuthState::default())),
            changed: Arc::new(changed),
            drain: Arc::new(StdMutex::new(None)),
        }
    }

    /// Point-in-time copy of the state with derived accessors.
    pub async fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot::new(self.state.read().await.clone())
    }

    /// Change signal: the value ticks on every state write. UI layers
    /// watch this and re-read the snapshot.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    /// Remember where to return after the next sign-in (one-shot).
    pub fn store_return_url(&self, url: &str) {
        self.persistence.store_redirect(url);
    }

    /// Take the stored return URL, clearing it.
    pub fn take_return_url(&self) -> Option<String> {
        self.persistence.take_redirect()
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Prime state from the persisted record, re-establish trust with a
    /// live fetch, then start draining the provider's event queue.
    ///
    /// Terminates with `loading == false` in every case; an unreachable
    /// provider is logged, not surfaced as a user error.
    pub async fn initialize(&self) {
        let persisted = self.persistence.load().unwrap_or_default();

        // Optimistic prime: trust nothing yet, but let the UI skip the
        // blank state for returning users.
        if persisted.user.is_some() {
            let mut st = self.state.write().await;
            st.user = persisted.user.clone();
            st.session = persisted.session.clone();
            drop(st);
            self.notify();
        }

        match persisted.session {
            Some(session) => match self.provider.restore_session(session).await {
                Ok(live) => {
                    self.handle_auth_change(AuthChangeEvent::InitialSession, Some(live))
                        .await;
                }
                Err(err) if err.is_network() => {
                    // Offline start: keep the primed identity, stop blocking
                    // the UI. The next successful request will reconcile.
                    tracing::warn!(%err, "session restore unreachable; continuing with persisted state");
                    let mut st = self.state.write().await;
                    st.loading = false;
                    st.is_authenticated = st.user.is_some();
                    st.is_email_verified = derive::is_email_verified(st.user.as_ref());
                    st.is_onboarding_complete = derive::is_onboarding_complete(st.user.as_ref());
                    drop(st);
                    self.notify();
                }
                Err(err) => {
                    // The provider rejected the persisted token.
                    tracing::warn!(%err, "persisted session rejected; starting signed out");
                    self.handle_auth_change(AuthChangeEvent::InitialSession, None)
                        .await;
                }
            },
            None => {
                self.handle_auth_change(AuthChangeEvent::InitialSession, None)
                    .await;
            }
        }

        self.spawn_event_drain();
    }

    /// Start the single consumer of the provider's push queue.
    fn spawn_event_drain(&self) {
        let Some(mut rx) = self.provider.events().take_receiver() else {
            return;
        };
        let store = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                store.handle_auth_change(change.event, change.session).await;
            }
        });
        if let Ok(mut slot) = self.drain.lock() {
            *slot = Some(handle);
        }
    }

    /// Stop the event drain. The store keeps its last state but no longer
    /// reacts to provider pushes.
    pub fn dispose(&self) {
        if let Ok(mut slot) = self.drain.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    /// The only writer of `user`, `session`, and the derived status flags.
    ///
    /// Also the step that completes initial loading: whatever else happens,
    /// once the first change lands `loading` is false for good.
    pub async fn handle_auth_change(
        &self,
        event: AuthChangeEvent,
        session: Option<ProviderSession>,
    ) {
        let user = session
            .as_ref()
            .map(|s| AuthUser::from_provider(s.user.clone()));

        {
            let mut st = self.state.write().await;
            st.user = user.clone();
            st.session = session.clone();
            st.is_authenticated = user.is_some();
            st.is_email_verified = derive::is_email_verified(user.as_ref());
            st.is_onboarding_complete = derive::is_onboarding_complete(user.as_ref());
            st.loading = false;
        }

        self.persistence.save(&user, &session);
        tracing::debug!(
            ?event,
            email = user.as_ref().and_then(|u| u.email.as_deref()),
            "auth state changed"
        );
        self.notify();
    }

    // ─── Mutators ───────────────────────────────────────────────────

    /// Register a new account. Without a password this requests a
    /// one-time sign-in link that creates the account on first use.
    ///
    /// Identity fields are untouched here; they arrive through the event
    /// queue once the provider confirms.
    pub async fn sign_up(&self, params: SignUpParams) -> Result<AuthData, AuthError> {
        self.begin(Op::SignUp).await;

        let result = match params.password {
            None => self
                .provider
                .sign_in_with_otp(OtpBody {
                    email: params.email.clone(),
                    create_user: true,
                    data: params.metadata.clone(),
                })
                .await
                .map(|_| AuthData {
                    user: None,
                    session: None,
                }),
            Some(ref password) => {
                self.provider
                    .sign_up(SignUpBody {
                        email: params.email.clone(),
                        password: password.clone(),
                        data: params.metadata.clone(),
                    })
                    .await
            }
        };

        self.settle(Op::SignUp, result).await
    }

    pub async fn sign_in(&self, params: SignInParams) -> Result<ProviderSession, AuthError> {
        self.begin(Op::SignIn).await;
        let result = self
            .provider
            .sign_in_with_password(&params.email, &params.password)
            .await;
        self.settle(Op::SignIn, result).await
    }

    /// Start a redirect-based OAuth flow. Returns the URL to send the
    /// browser to; the session arrives later through the event queue, after
    /// the redirect completes.
    pub async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
    ) -> Result<String, AuthError> {
        self.begin(Op::SignIn).await;
        let result = self.provider.authorize_url(
            OAuthParams::new(provider)
                .redirect_to(redirect_url)
                .query_param("access_type", "offline")
                .query_param("prompt", "consent"),
        );
        self.settle(Op::SignIn, result).await
    }

    /// Sign out and wipe all persisted local state, not just memory, so a
    /// shared device keeps nothing.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.begin(Op::SignOut).await;
        let result = self.provider.sign_out().await;
        if result.is_ok() {
            self.persistence.clear_all();
        }
        self.settle(Op::SignOut, result).await
    }

    pub async fn update_profile(
        &self,
        params: UpdateProfileParams,
    ) -> Result<freightline_provider::ProviderUser, AuthError> {
        self.begin(Op::UpdateProfile).await;
        let result = self
            .provider
            .update_user(UserAttributes {
                email: params.email,
                password: params.password,
                data: params.metadata,
            })
            .await;
        self.settle(Op::UpdateProfile, result).await
    }

    /// Upload an avatar and patch the profile with its public URL.
    ///
    /// Two steps, deliberately not transactional: a profile-patch failure
    /// after a successful upload leaves the object orphaned in the bucket
    /// but the user record consistent. The orphan is logged for
    /// out-of-band cleanup.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AuthError> {
        self.begin(Op::UpdateProfile).await;

        let user_id = {
            let st = self.state.read().await;
            st.user.as_ref().map(|u| u.id.clone())
        };
        let Some(user_id) = user_id else {
            let err = AuthError::not_authenticated(self.options.locale);
            return self.settle(Op::UpdateProfile, Err(err)).await;
        };

        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin");
        let key = format!(
            "{user_id}-{}.{ext}",
            chrono::Utc::now().timestamp_millis()
        );
        let bucket = self.options.avatar_bucket.clone();

        if let Err(err) = self
            .objects
            .upload(&bucket, &key, bytes, content_type, true)
            .await
        {
            let err = normalize(&err, self.options.locale);
            return self.settle(Op::UpdateProfile, Err(err)).await;
        }

        let url = self.objects.public_url(&bucket, &key);

        let mut metadata = MetadataMap::new();
        metadata.insert("avatar_url".into(), serde_json::json!(url.clone()));
        match self
            .update_profile(UpdateProfileParams {
                metadata,
                ..Default::default()
            })
            .await
        {
            Ok(_) => {
                self.finish(Op::UpdateProfile, None).await;
                Ok(url)
            }
            Err(err) => {
                tracing::warn!(
                    %bucket,
                    %key,
                    "avatar uploaded but profile patch failed; object is orphaned"
                );
                self.finish(Op::UpdateProfile, Some(&err)).await;
                Err(err)
            }
        }
    }

    /// Resend the registration confirmation email. Fails fast locally when
    /// no signed-in user with an email exists; no request is issued.
    pub async fn resend_verification(&self) -> Result<(), AuthError> {
        self.clear_error().await;

        let email = {
            let st = self.state.read().await;
            st.user.as_ref().and_then(|u| u.email.clone())
        };
        let Some(email) = email else {
            let err = AuthError::with_message(
                AuthErrorKind::NotAuthenticated,
                messages::missing_email(self.options.locale),
            );
            self.store_error(&err).await;
            return Err(err);
        };

        match self.provider.resend_signup(&email).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = normalize(&err, self.options.locale);
                self.store_error(&err).await;
                Err(err)
            }
        }
    }

    /// Request a password-reset email. The result shape is identical for
    /// known and unknown addresses; account existence is not observable
    /// here.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.clear_error().await;

        let redirect = format!(
            "{}{}",
            self.options.site_url.trim_end_matches('/'),
            self.options.reset_password_path
        );
        match self.provider.recover(email, Some(&redirect)).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = normalize(&err, self.options.locale);
                self.store_error(&err).await;
                Err(err)
            }
        }
    }

    /// Dismiss the current error. Idempotent.
    pub async fn clear_error(&self) {
        let mut st = self.state.write().await;
        st.error = None;
        drop(st);
        self.notify();
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn notify(&self) {
        self.changed.send_modify(|v| *v = v.wrapping_add(1));
    }

    async fn begin(&self, op: Op) {
        let mut st = self.state.write().await;
        st.error = None;
        st.set_op(op, true);
        drop(st);
        self.notify();
    }

    async fn finish(&self, op: Op, error: Option<&AuthError>) {
        let mut st = self.state.write().await;
        st.set_op(op, false);
        if let Some(err) = error {
            st.error = Some(err.message.clone());
        }
        drop(st);
        self.notify();
    }

    async fn store_error(&self, err: &AuthError) {
        tracing::debug!(
            code = err.kind.as_code(),
            detail = err.detail.as_deref(),
            "auth operation failed"
        );
        let mut st = self.state.write().await;
        st.error = Some(err.message.clone());
        drop(st);
        self.notify();
    }

    /// Resolve an operation: reset its flag, record the failure if any,
    /// normalize provider errors into the closed taxonomy.
    async fn settle<T, E>(&self, op: Op, result: Result<T, E>) -> Result<T, AuthError>
    where
        E: Into<SettledError>,
    {
        match result {
            Ok(value) => {
                self.finish(op, None).await;
                Ok(value)
            }
            Err(err) => {
                let err = match err.into() {
                    SettledError::Provider(p) => normalize(&p, self.options.locale),
                    SettledError::Auth(a) => a,
                };
                tracing::debug!(
                    code = err.kind.as_code(),
                    detail = err.detail.as_deref(),
                    "auth operation failed"
                );
                self.finish(op, Some(&err)).await;
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("options", &self.options)
            .finish()
    }
}

/// Either a raw provider failure (still to normalize) or an already
/// normalized error. Lets `settle` accept both.
pub(crate) enum SettledError {
    Provider(freightline_provider::ProviderError),
    Auth(AuthError),
}

impl From<freightline_provider::ProviderError> for SettledError {
    fn from(err: freightline_provider::ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<AuthError> for SettledError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}
