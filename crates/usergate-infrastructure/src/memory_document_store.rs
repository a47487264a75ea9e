//! In-memory document store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use usergate_core::DirectoryError;
use usergate_core::document::{Document, DocumentStore, Fields, Query};

/// A [`DocumentStore`] backed by a map. Contents are lost on drop.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DirectoryError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(query.apply(
            documents
                .iter()
                .map(|(id, fields)| Document::new(id.clone(), fields.clone())),
        ))
    }

    async fn read_document(&self, collection: &str, id: &str) -> Result<Option<Fields>, DirectoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), DirectoryError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn write(&self, collection: &str, id: &str, partial: Fields) -> Result<(), DirectoryError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| DirectoryError::not_found(collection, id))?;
        existing.extend(partial);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), DirectoryError> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use usergate_core::document::OrderBy;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_write_merges_into_existing_document() {
        let store = InMemoryDocumentStore::new();
        store
            .create_document("users", "u1", fields(json!({"name": "A", "status": "active"})))
            .await
            .unwrap();

        store
            .write("users", "u1", fields(json!({"status": "blocked"})))
            .await
            .unwrap();

        let stored = store.read_document("users", "u1").await.unwrap().unwrap();
        assert_eq!(stored.get("name"), Some(&json!("A")));
        assert_eq!(stored.get("status"), Some(&json!("blocked")));
    }

    #[tokio::test]
    async fn test_write_to_missing_document_fails() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .write("users", "ghost", fields(json!({"status": "blocked"})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = InMemoryDocumentStore::new();
        store
            .create_document("users", "u1", fields(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        store.remove("users", "u1").await.unwrap();
        store.remove("users", "u1").await.unwrap();
        assert_eq!(store.len("users").await, 0);
    }

    #[tokio::test]
    async fn test_query_orders_documents() {
        let store = InMemoryDocumentStore::new();
        store
            .create_document("users", "z", fields(json!({"email": "a@x.com"})))
            .await
            .unwrap();
        store
            .create_document("users", "a", fields(json!({"email": "b@x.com"})))
            .await
            .unwrap();

        let ids: Vec<String> = store
            .query("users", &Query::new().order_by(OrderBy::asc("email")))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["z", "a"]);
    }
}
