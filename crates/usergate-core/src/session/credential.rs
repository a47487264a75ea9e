//! Credential service trait.

use super::model::Identity;
use crate::error::CredentialError;
use async_trait::async_trait;

/// The external authentication backend.
///
/// Implementations own credential storage and password verification. They
/// do not hold the ambient "current identity"; [`super::SessionStore`] does.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Creates a credential for `email`.
    ///
    /// # Errors
    ///
    /// - `CredentialError::EmailInUse`: a credential already exists for `email`
    /// - `CredentialError::Other`: any other refusal (weak password, bad email, outage)
    async fn create_credential(&self, email: &str, password: &str) -> Result<Identity, CredentialError>;

    /// Checks `password` against the credential stored for `email`.
    ///
    /// # Errors
    ///
    /// - `CredentialError::UserNotFound`: no credential for `email`
    /// - `CredentialError::WrongPassword`: the password does not match
    /// - `CredentialError::Other`: backend failure
    async fn verify_credential(&self, email: &str, password: &str) -> Result<Identity, CredentialError>;

    /// Revokes whatever backend-side session token the service keeps.
    async fn clear_session(&self) -> Result<(), CredentialError>;
}
