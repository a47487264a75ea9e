//! Error types for usergate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the credential service.
///
/// The first four variants carry a distinct user-facing meaning and are
/// matched at the form boundary. Everything else is folded into `Other`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialError {
    /// Credential creation was refused because the email is taken.
    #[error("email already in use")]
    EmailInUse,

    /// No credential exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// The password did not match the stored credential.
    #[error("wrong password")]
    WrongPassword,

    /// The account exists but has been blocked by an administrator.
    #[error("account blocked")]
    AccountBlocked,

    /// Any other backend failure (weak password, malformed email, outage).
    #[error("credential error: {0}")]
    Other(String),
}

impl CredentialError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Failures reported by the document store.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryError {
    /// A partial write targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The store could not be reached or failed to persist.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A stored document could not be decoded into the expected shape.
    #[error("malformed document {id}: {message}")]
    Malformed { id: String, message: String },
}

impl DirectoryError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn malformed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Startup failures outside the two collaborator contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsergateError {
    /// The configuration could not be located, read, or written.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UsergateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
