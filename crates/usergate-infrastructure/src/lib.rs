pub mod backend;
pub mod config_service;
pub mod file_document_store;
pub mod local_credential_service;
pub mod memory_document_store;
pub mod password;
pub mod paths;
pub mod storage;

pub use crate::backend::Backend;
pub use crate::config_service::ConfigService;
pub use crate::file_document_store::FileDocumentStore;
pub use crate::local_credential_service::LocalCredentialService;
pub use crate::memory_document_store::InMemoryDocumentStore;
