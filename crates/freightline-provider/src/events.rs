//! Push channel for auth-change notifications.
//!
//! The provider announces every identity change (sign-in, sign-out, token
//! refresh, profile update) on this channel. There is exactly one consumer:
//! the session store drains the queue in order, so a pushed event can never
//! interleave halfway through the handling of an earlier one.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::ProviderSession;

/// The kinds of auth-change notifications the provider emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// One pushed notification: the event kind plus the session as of that
/// moment (`None` once signed out).
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthChangeEvent,
    pub session: Option<ProviderSession>,
}

/// Single-consumer event queue.
///
/// Events are appended by the provider client and drained by whoever takes
/// the receiver. Emission is best-effort: once the consumer is gone the
/// queue silently drops events, which is the correct behavior during
/// teardown.
#[derive(Debug)]
pub struct AuthEvents {
    tx: mpsc::UnboundedSender<AuthChange>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<AuthChange>>>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Append an event to the queue.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<ProviderSession>) {
        tracing::debug!(?event, has_session = session.is_some(), "auth change");
        let _ = self.tx.send(AuthChange { event, session });
    }

    /// Take the queue's receiving end. Returns `None` after the first call;
    /// there is only ever one consumer.
    pub fn take_receiver(&self) -> Option<mpsc::UnboundedReceiver<AuthChange>> {
        self.rx.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_can_only_be_taken_once() {
        let events = AuthEvents::new();
        assert!(events.take_receiver().is_some());
        assert!(events.take_receiver().is_none());
    }

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let events = AuthEvents::new();
        let mut rx = events.take_receiver().unwrap();

        events.emit(AuthChangeEvent::SignedIn, None);
        events.emit(AuthChangeEvent::UserUpdated, None);
        events.emit(AuthChangeEvent::SignedOut, None);

        assert_eq!(rx.recv().await.unwrap().event, AuthChangeEvent::SignedIn);
        assert_eq!(rx.recv().await.unwrap().event, AuthChangeEvent::UserUpdated);
        assert_eq!(rx.recv().await.unwrap().event, AuthChangeEvent::SignedOut);
    }

    #[test]
    fn emit_without_consumer_does_not_panic() {
        let events = AuthEvents::new();
        drop(events.take_receiver());
        events.emit(AuthChangeEvent::SignedIn, None);
    }
}
