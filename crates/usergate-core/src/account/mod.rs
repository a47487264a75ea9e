//! Account domain module.
//!
//! # Module Structure
//!
//! - `model`: `AccountRecord`, `AccountId`, `AccountStatus`
//! - `directory`: `AccountDirectory`, the typed view over the document store
//!
//! # Usage
//!
//! ```ignore
//! use usergate_core::account::{AccountDirectory, AccountRecord, AccountStatus};
//! ```

mod directory;
mod model;

pub use directory::AccountDirectory;
pub use model::{AccountId, AccountRecord, AccountStatus, canonical_email, fields};
