//! Session store: the single observable holding the current identity.

use super::credential::CredentialService;
use super::model::Identity;
use crate::error::CredentialError;
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the current identity and notifies subscribers when it changes.
///
/// One instance is created at startup and injected wherever the identity is
/// needed. Views subscribe on mount and drop the [`SessionSubscription`] on
/// unmount; there is no global state.
pub struct SessionStore {
    credentials: Arc<dyn CredentialService>,
    current: watch::Sender<Option<Identity>>,
}

impl SessionStore {
    pub fn new(credentials: Arc<dyn CredentialService>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            credentials,
            current,
        }
    }

    /// Returns the identity currently signed in, if any.
    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Registers a new observer of identity changes.
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.current.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.current.receiver_count()
    }

    /// Creates a credential and signs the new identity in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let identity = self.credentials.create_credential(email, password).await?;
        self.current.send_replace(Some(identity.clone()));
        tracing::info!(uid = %identity.uid, "Signed up");
        Ok(identity)
    }

    /// Verifies credentials and signs the identity in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let identity = self.credentials.verify_credential(email, password).await?;
        self.current.send_replace(Some(identity.clone()));
        tracing::info!(uid = %identity.uid, "Signed in");
        Ok(identity)
    }

    /// Clears the session.
    ///
    /// Returns `true` only for the call that actually removed an identity.
    /// Subscribers are notified once; later calls are no-ops.
    pub async fn sign_out(&self) -> Result<bool, CredentialError> {
        self.credentials.clear_session().await?;
        let cleared = self.current.send_if_modified(|current| current.take().is_some());
        if cleared {
            tracing::info!("Signed out");
        }
        Ok(cleared)
    }
}

/// A live observation of the session. Dropping it unsubscribes.
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<Identity>>,
}

impl SessionSubscription {
    /// The latest identity seen by this subscription.
    pub fn current(&self) -> Option<Identity> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next identity change.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Whether a change arrived that has not been observed via [`Self::changed`].
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedCredentials;

    #[async_trait]
    impl CredentialService for FixedCredentials {
        async fn create_credential(&self, email: &str, _password: &str) -> Result<Identity, CredentialError> {
            if email == "taken@x.com" {
                return Err(CredentialError::EmailInUse);
            }
            Ok(Identity::new("new-uid", email))
        }

        async fn verify_credential(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
            match (email, password) {
                ("a@x.com", "secret") => Ok(Identity::new("u1", email)),
                ("a@x.com", _) => Err(CredentialError::WrongPassword),
                _ => Err(CredentialError::UserNotFound),
            }
        }

        async fn clear_session(&self) -> Result<(), CredentialError> {
            Ok(())
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(FixedCredentials))
    }

    #[tokio::test]
    async fn test_sign_in_sets_current_identity() {
        let store = store();
        assert!(store.current().is_none());

        let identity = store.sign_in("a@x.com", "secret").await.unwrap();
        assert_eq!(identity.uid.as_str(), "u1");
        assert_eq!(store.current(), Some(identity));
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_session_untouched() {
        let store = store();
        let err = store.sign_in("a@x.com", "nope").await.unwrap_err();
        assert_eq!(err, CredentialError::WrongPassword);
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_reports_clear_exactly_once() {
        let store = store();
        store.sign_in("a@x.com", "secret").await.unwrap();

        assert!(store.sign_out().await.unwrap());
        assert!(!store.sign_out().await.unwrap());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_subscription_observes_changes_and_unsubscribes_on_drop() {
        let store = store();
        let mut subscription = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        store.sign_up("b@x.com", "secret").await.unwrap();
        let seen = subscription.changed().await.unwrap();
        assert_eq!(seen.map(|i| i.email), Some("b@x.com".to_string()));

        store.sign_out().await.unwrap();
        assert_eq!(subscription.changed().await, Some(None));

        drop(subscription);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_without_session_does_not_notify() {
        let store = store();
        let subscription = store.subscribe();
        assert!(!store.sign_out().await.unwrap());
        assert!(!subscription.has_changed());
    }
}
