//! Document store trait.
//!
//! Defines the interface for the external document database the console
//! reads account profiles from and writes moderation results to.

use super::model::{Document, Fields, Query};
use crate::error::DirectoryError;
use async_trait::async_trait;

/// An abstract document store keyed by `(collection, id)`.
///
/// This trait decouples the console from the concrete backend (a managed
/// cloud database, the local JSON files, or an in-memory map).
///
/// # Implementation Notes
///
/// - `write` merges fields into an existing document and fails with
///   `DirectoryError::NotFound` when the document is absent.
/// - `create_document` replaces the document wholesale.
/// - `remove` succeeds whether or not the document existed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs a query against a collection.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Document>)`: Matching documents in query order
    /// - `Err(_)`: The store could not be read
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DirectoryError>;

    /// Reads a single document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Fields))`: Document found
    /// - `Ok(None)`: Document absent
    /// - `Err(_)`: The store could not be read
    async fn read_document(&self, collection: &str, id: &str) -> Result<Option<Fields>, DirectoryError>;

    /// Creates (or overwrites) a document.
    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), DirectoryError>;

    /// Merges `partial` into an existing document.
    async fn write(&self, collection: &str, id: &str, partial: Fields) -> Result<(), DirectoryError>;

    /// Deletes a document.
    async fn remove(&self, collection: &str, id: &str) -> Result<(), DirectoryError>;
}
