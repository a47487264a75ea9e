//! File-backed document store.
//!
//! Each collection is one JSON file (`<root>/<collection>.json`) mapping
//! document ids to their fields. Every mutation is a locked read-modify-write
//! through [`AtomicFile`], so a crash never leaves a half-written collection.
//! Writers to one collection are also queued in-process, so a batch of
//! concurrent writes does not pile up on the file lock.

use crate::storage::{AtomicFile, AtomicFileError, Json};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use usergate_core::DirectoryError;
use usergate_core::document::{Document, DocumentStore, Fields, Query};

type Collection = BTreeMap<String, Fields>;

impl From<AtomicFileError> for DirectoryError {
    fn from(err: AtomicFileError) -> Self {
        DirectoryError::unavailable(err.to_string())
    }
}

/// A [`DocumentStore`] persisting collections under a root directory.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
    writers: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl FileDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            writers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn collection_file(&self, collection: &str) -> Result<AtomicFile<Collection, Json>, DirectoryError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DirectoryError::PermissionDenied(format!(
                "invalid collection name '{}'",
                collection
            )));
        }
        Ok(AtomicFile::new(self.root.join(format!("{}.json", collection))))
    }

    /// Waits for this collection's turn to write.
    async fn writer(&self, collection: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut writers = self.writers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            writers.entry(collection.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Runs blocking file I/O off the async executor.
    async fn blocking<R, F>(task: F) -> Result<R, DirectoryError>
    where
        R: Send + 'static,
        F: FnOnce() -> Result<R, DirectoryError> + Send + 'static,
    {
        tokio::task::spawn_blocking(task)
            .await
            .map_err(|e| DirectoryError::unavailable(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DirectoryError> {
        let file = self.collection_file(collection)?;
        let query = query.clone();
        Self::blocking(move || {
            let documents = file.load()?.unwrap_or_default();
            Ok(query.apply(
                documents
                    .into_iter()
                    .map(|(id, fields)| Document::new(id, fields)),
            ))
        })
        .await
    }

    async fn read_document(&self, collection: &str, id: &str) -> Result<Option<Fields>, DirectoryError> {
        let file = self.collection_file(collection)?;
        let id = id.to_string();
        Self::blocking(move || {
            let mut documents = file.load()?.unwrap_or_default();
            Ok(documents.remove(&id))
        })
        .await
    }

    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), DirectoryError> {
        let file = self.collection_file(collection)?;
        let id = id.to_string();
        let turn = self.writer(collection).await;
        Self::blocking(move || {
            let _turn = turn;
            file.update(Collection::new(), |documents| {
                documents.insert(id, fields);
                Ok::<_, DirectoryError>(())
            })
        })
        .await
    }

    async fn write(&self, collection: &str, id: &str, partial: Fields) -> Result<(), DirectoryError> {
        let file = self.collection_file(collection)?;
        let turn = self.writer(collection).await;
        let collection = collection.to_string();
        let id = id.to_string();
        Self::blocking(move || {
            let _turn = turn;
            file.update(Collection::new(), |documents| {
                let existing = documents
                    .get_mut(&id)
                    .ok_or_else(|| DirectoryError::not_found(collection, id.clone()))?;
                existing.extend(partial);
                Ok(())
            })
        })
        .await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), DirectoryError> {
        let file = self.collection_file(collection)?;
        let id = id.to_string();
        let turn = self.writer(collection).await;
        Self::blocking(move || {
            let _turn = turn;
            file.update(Collection::new(), |documents| {
                documents.remove(&id);
                Ok::<_, DirectoryError>(())
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use usergate_core::document::OrderBy;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_documents_survive_reopening() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path().to_path_buf());
        store
            .create_document("users", "u1", fields(json!({"email": "a@x.com", "status": "active"})))
            .await
            .unwrap();

        let reopened = FileDocumentStore::new(temp_dir.path().to_path_buf());
        let stored = reopened.read_document("users", "u1").await.unwrap().unwrap();
        assert_eq!(stored.get("email"), Some(&json!("a@x.com")));
        assert!(temp_dir.path().join("users.json").exists());
    }

    #[tokio::test]
    async fn test_write_missing_document_is_not_found_and_not_created() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path().to_path_buf());

        let err = store
            .write("users", "ghost", fields(json!({"status": "blocked"})))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::not_found("users", "ghost"));
        assert!(store.read_document("users", "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path().to_path_buf());
        for (id, email) in [("u1", "b@x.com"), ("u2", "a@x.com")] {
            store
                .create_document("users", id, fields(json!({"email": email})))
                .await
                .unwrap();
        }

        store.remove("users", "u1").await.unwrap();
        let remaining = store
            .query("users", &Query::new().order_by(OrderBy::asc("email")))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "u2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_keep_every_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path().to_path_buf());

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_document("users", &format!("u{:02}", n), fields(json!({"n": n})))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reopened = FileDocumentStore::new(temp_dir.path().to_path_buf());
        let stored = reopened.query("users", &Query::new()).await.unwrap();
        assert_eq!(stored.len(), 32);
    }

    #[tokio::test]
    async fn test_rejects_path_like_collection_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(temp_dir.path().to_path_buf());
        let err = store.query("../etc", &Query::new()).await.unwrap_err();
        assert!(matches!(err, DirectoryError::PermissionDenied(_)));
    }
}
