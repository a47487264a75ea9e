//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the signed-in `Identity`
//! - `credential`: `CredentialService`, the external authentication backend
//! - `store`: `SessionStore`, the injected observable of the current identity
//!
//! # Usage
//!
//! ```ignore
//! use usergate_core::session::{CredentialService, Identity, SessionStore};
//! ```

mod credential;
mod model;
mod store;

pub use credential::CredentialService;
pub use model::Identity;
pub use store::{SessionStore, SessionSubscription};
