//! Local credential service.
//!
//! Stands in for a managed authentication backend: stores email/password
//! credentials (Argon2id hashes) either in memory or in a TOML file.

use crate::password::{hash_password, verify_password};
use crate::storage::{AtomicFile, AtomicFileError, Toml};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use usergate_core::CredentialError;
use usergate_core::account::canonical_email;
use usergate_core::session::{CredentialService, Identity};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialEntry {
    uid: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default, rename = "credential")]
    credentials: Vec<CredentialEntry>,
}

impl From<AtomicFileError> for CredentialError {
    fn from(err: AtomicFileError) -> Self {
        CredentialError::other(err.to_string())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// A [`CredentialService`] that keeps credentials locally.
///
/// Argon2 work and file writes run on blocking tasks; the entry list lock is
/// never held while a password is hashed or verified.
pub struct LocalCredentialService {
    entries: Mutex<Vec<CredentialEntry>>,
    path: Option<PathBuf>,
    min_password_length: usize,
}

impl LocalCredentialService {
    /// Credentials held in memory only.
    pub fn in_memory(min_password_length: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            path: None,
            min_password_length,
        }
    }

    /// Credentials persisted to a TOML file, loaded now if it exists.
    pub fn open(path: PathBuf, min_password_length: usize) -> Result<Self, CredentialError> {
        let loaded = credential_file(path.clone()).load()?.unwrap_or_default();
        tracing::debug!(
            path = %path.display(),
            count = loaded.credentials.len(),
            "Loaded local credentials"
        );
        Ok(Self {
            entries: Mutex::new(loaded.credentials),
            path: Some(path),
            min_password_length,
        })
    }

    async fn persist(&self, entries: &[CredentialEntry]) -> Result<(), CredentialError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let contents = CredentialFile {
            credentials: entries.to_vec(),
        };
        blocking(move || Ok(credential_file(path).save(&contents)?)).await
    }
}

fn credential_file(path: PathBuf) -> AtomicFile<CredentialFile, Toml> {
    AtomicFile::new(path)
}

/// Runs Argon2 or file I/O off the async executor.
async fn blocking<R, F>(task: F) -> Result<R, CredentialError>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R, CredentialError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| CredentialError::other(format!("credential task failed: {}", e)))?
}

#[async_trait]
impl CredentialService for LocalCredentialService {
    async fn create_credential(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let email = canonical_email(email);
        if !is_plausible_email(&email) {
            return Err(CredentialError::other(format!("invalid email '{}'", email)));
        }
        if password.chars().count() < self.min_password_length {
            return Err(CredentialError::other(format!(
                "weak password: at least {} characters required",
                self.min_password_length
            )));
        }
        if self.entries.lock().await.iter().any(|entry| entry.email == email) {
            return Err(CredentialError::EmailInUse);
        }

        let password = password.to_string();
        let password_hash = blocking(move || {
            hash_password(&password)
                .map_err(|e| CredentialError::other(format!("password hashing failed: {}", e)))
        })
        .await?;

        // Re-checked: another registration may have taken the email while hashing.
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|entry| entry.email == email) {
            return Err(CredentialError::EmailInUse);
        }

        let entry = CredentialEntry {
            uid: Uuid::new_v4().simple().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        let identity = Identity::new(entry.uid.clone(), entry.email.clone());

        entries.push(entry);
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }

        tracing::debug!(uid = %identity.uid, "Created local credential");
        Ok(identity)
    }

    async fn verify_credential(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let email = canonical_email(email);
        let (identity, stored_hash) = {
            let entries = self.entries.lock().await;
            let entry = entries
                .iter()
                .find(|entry| entry.email == email)
                .ok_or(CredentialError::UserNotFound)?;
            (
                Identity::new(entry.uid.clone(), entry.email.clone()),
                entry.password_hash.clone(),
            )
        };

        let password = password.to_string();
        let matches = blocking(move || Ok(verify_password(&password, &stored_hash))).await?;
        if !matches {
            return Err(CredentialError::WrongPassword);
        }

        Ok(identity)
    }

    async fn clear_session(&self) -> Result<(), CredentialError> {
        // No server-side tokens are issued locally.
        Ok(())
    }
}
