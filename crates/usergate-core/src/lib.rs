//! Domain layer for usergate.
//!
//! Models, collaborator traits, and errors shared by the infrastructure,
//! application, and console crates.

pub mod account;
pub mod config;
pub mod document;
pub mod error;
pub mod route;
pub mod session;

// Re-export common types
pub use error::{CredentialError, DirectoryError, UsergateError};
pub use route::Route;
