//! Account registration use case.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use usergate_core::account::{AccountDirectory, AccountRecord};
use usergate_core::session::SessionStore;
use usergate_core::{CredentialError, DirectoryError, Route};

pub const EMAIL_IN_USE_MESSAGE: &str =
    "The email address is already in use. Please use a different email.";
pub const REGISTRATION_FAILED_MESSAGE: &str =
    "An error occurred during registration. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("email already in use")]
    EmailInUse,

    #[error("credential creation failed: {0}")]
    Credential(CredentialError),

    /// The credential exists but its profile document could not be written.
    #[error("profile write failed: {0}")]
    Profile(DirectoryError),
}

impl RegistrationError {
    /// Text shown next to the sign-up form.
    pub fn user_message(&self) -> &'static str {
        match self {
            RegistrationError::EmailInUse => EMAIL_IN_USE_MESSAGE,
            _ => REGISTRATION_FAILED_MESSAGE,
        }
    }
}

impl From<CredentialError> for RegistrationError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmailInUse => RegistrationError::EmailInUse,
            other => RegistrationError::Credential(other),
        }
    }
}

/// A completed registration.
#[derive(Debug, Clone)]
pub struct Registered {
    pub account: AccountRecord,
    /// Where the console goes next.
    pub next: Route,
}

/// Creates a credential, then the matching profile document.
///
/// The two steps are not atomic. If the profile write fails the credential
/// stays behind without a profile; that account cannot sign in until an
/// operator writes the document.
pub struct RegistrationUseCase {
    session: Arc<SessionStore>,
    directory: AccountDirectory,
}

impl RegistrationUseCase {
    pub fn new(session: Arc<SessionStore>, directory: AccountDirectory) -> Self {
        Self { session, directory }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Registered, RegistrationError> {
        let identity = self.session.sign_up(email, password).await.map_err(|e| {
            tracing::info!("Registration refused: {}", e);
            RegistrationError::from(e)
        })?;

        let account = AccountRecord::registered(
            identity.uid.clone(),
            name.trim(),
            identity.email.clone(),
            Utc::now(),
        );

        if let Err(e) = self.directory.create(&account).await {
            tracing::warn!(
                uid = %identity.uid,
                "Credential created but profile write failed: {}",
                e
            );
            return Err(RegistrationError::Profile(e));
        }

        tracing::info!(uid = %account.id, "Registered account");
        Ok(Registered {
            account,
            next: Route::SignIn,
        })
    }
}
