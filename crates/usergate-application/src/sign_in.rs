//! Sign-in use case.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use usergate_core::account::{AccountDirectory, AccountRecord, canonical_email};
use usergate_core::session::{Identity, SessionStore};
use usergate_core::{CredentialError, DirectoryError, Route};

pub const USER_NOT_FOUND_MESSAGE: &str = "No user found with this email.";
pub const WRONG_PASSWORD_MESSAGE: &str = "Incorrect password.";
pub const ACCOUNT_BLOCKED_MESSAGE: &str = "Your account is blocked. Please contact support.";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Error logging in. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignInError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl SignInError {
    /// Text shown next to the sign-in form.
    pub fn user_message(&self) -> &'static str {
        match self {
            SignInError::Credential(CredentialError::UserNotFound) => USER_NOT_FOUND_MESSAGE,
            SignInError::Credential(CredentialError::WrongPassword) => WRONG_PASSWORD_MESSAGE,
            SignInError::Credential(CredentialError::AccountBlocked) => ACCOUNT_BLOCKED_MESSAGE,
            _ => SIGN_IN_FAILED_MESSAGE,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, SignInError::Credential(CredentialError::AccountBlocked))
    }
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: Identity,
    pub account: AccountRecord,
    pub next: Route,
}

pub struct SignInUseCase {
    session: Arc<SessionStore>,
    directory: AccountDirectory,
}

impl SignInUseCase {
    pub fn new(session: Arc<SessionStore>, directory: AccountDirectory) -> Self {
        Self { session, directory }
    }

    /// Signs in and records the login time.
    ///
    /// Blocked accounts are rejected before the password is checked. Any
    /// failure after the credential check clears the session again.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, SignInError> {
        let email = canonical_email(email);

        if let Some(record) = self.directory.find_by_email(&email).await? {
            if record.status.is_blocked() {
                tracing::info!(uid = %record.id, "Refused sign-in for blocked account");
                return Err(CredentialError::AccountBlocked.into());
            }
        }

        let identity = self.session.sign_in(&email, password).await?;

        let account = match self.directory.get(&identity.uid).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::warn!(uid = %identity.uid, "Signed in without a profile document");
                self.abandon().await;
                return Err(CredentialError::other("no profile for this account").into());
            }
            Err(e) => {
                self.abandon().await;
                return Err(e.into());
            }
        };

        // The profile may have been blocked between the lookup and now.
        if account.status.is_blocked() {
            self.abandon().await;
            return Err(CredentialError::AccountBlocked.into());
        }

        let now = Utc::now();
        if let Err(e) = self.directory.touch_last_login(&identity.uid, now).await {
            tracing::warn!(uid = %identity.uid, "Failed to record last login: {}", e);
            self.abandon().await;
            return Err(e.into());
        }

        let account = AccountRecord {
            last_login: Some(now),
            ..account
        };
        Ok(SignedIn {
            identity,
            account,
            next: Route::PrivatePage,
        })
    }

    async fn abandon(&self) {
        if let Err(e) = self.session.sign_out().await {
            tracing::warn!("Failed to clear session after aborted sign-in: {}", e);
        }
    }
}
