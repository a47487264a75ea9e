//! Document store domain module.
//!
//! - `model`: `Document`, `Fields`, and the `Query` evaluator shared by local stores
//! - `store`: the `DocumentStore` collaborator trait

mod model;
mod store;

pub use model::{Document, Fields, OrderBy, Query, SortDirection, compare_values};
pub use store::DocumentStore;
