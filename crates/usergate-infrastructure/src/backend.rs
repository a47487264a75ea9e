//! Backend wiring: picks the credential service and document store.

use crate::file_document_store::FileDocumentStore;
use crate::local_credential_service::LocalCredentialService;
use crate::memory_document_store::InMemoryDocumentStore;
use crate::paths::UsergatePaths;
use std::path::PathBuf;
use std::sync::Arc;
use usergate_core::UsergateError;
use usergate_core::config::{BackendKind, RootConfig};
use usergate_core::document::DocumentStore;
use usergate_core::session::CredentialService;

/// The two collaborators every flow talks to.
#[derive(Clone)]
pub struct Backend {
    pub credentials: Arc<dyn CredentialService>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Backend {
    /// A fresh in-memory backend.
    pub fn in_memory(config: &RootConfig) -> Self {
        Self {
            credentials: Arc::new(LocalCredentialService::in_memory(
                config.credentials.min_password_length,
            )),
            documents: Arc::new(InMemoryDocumentStore::new()),
        }
    }

    /// A file backend rooted at `data_dir`.
    pub fn file(config: &RootConfig, data_dir: PathBuf) -> Result<Self, UsergateError> {
        let credentials = LocalCredentialService::open(
            UsergatePaths::credentials_file(&data_dir),
            config.credentials.min_password_length,
        )
        .map_err(|e| UsergateError::config(e.to_string()))?;
        let documents = FileDocumentStore::new(UsergatePaths::documents_dir(&data_dir));
        tracing::info!(data_dir = %data_dir.display(), "Using file backend");

        Ok(Self {
            credentials: Arc::new(credentials),
            documents: Arc::new(documents),
        })
    }

    /// Builds the backend named by the configuration.
    ///
    /// The file backend uses `backend.data_dir` when set, otherwise the
    /// platform data directory.
    pub fn from_config(config: &RootConfig) -> Result<Self, UsergateError> {
        match config.backend.kind {
            BackendKind::Memory => {
                tracing::info!("Using in-memory backend");
                Ok(Self::in_memory(config))
            }
            BackendKind::File => {
                let data_dir = match &config.backend.data_dir {
                    Some(dir) => dir.clone(),
                    None => UsergatePaths::data_dir().map_err(|e| UsergateError::config(e.to_string()))?,
                };
                Self::file(config, data_dir)
            }
        }
    }
}
