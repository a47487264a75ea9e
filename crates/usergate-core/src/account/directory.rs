//! Typed access to the account collection.

use super::model::{AccountId, AccountRecord, AccountStatus, fields};
use crate::document::{Document, DocumentStore, Fields, OrderBy, Query};
use crate::error::DirectoryError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Account-shaped view over a [`DocumentStore`] collection.
///
/// Every method issues exactly one store call, so callers can reason about
/// which network writes a batch action produces.
#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Lists every account, ordered by email and then status, ascending.
    pub async fn list(&self) -> Result<Vec<AccountRecord>, DirectoryError> {
        let query = Query::new()
            .order_by(OrderBy::asc(fields::EMAIL))
            .order_by(OrderBy::asc(fields::STATUS));

        self.store
            .query(&self.collection, &query)
            .await?
            .into_iter()
            .map(AccountRecord::from_document)
            .collect()
    }

    pub async fn get(&self, id: &AccountId) -> Result<Option<AccountRecord>, DirectoryError> {
        let Some(stored) = self.store.read_document(&self.collection, id.as_str()).await? else {
            return Ok(None);
        };
        AccountRecord::from_document(Document::new(id.as_str(), stored)).map(Some)
    }

    /// Finds the first account registered under `email`.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, DirectoryError> {
        let query = Query::new().where_eq(fields::EMAIL, email);
        let mut matches = self.store.query(&self.collection, &query).await?;
        if matches.is_empty() {
            return Ok(None);
        }
        AccountRecord::from_document(matches.remove(0)).map(Some)
    }

    /// Writes the full profile document.
    pub async fn create(&self, record: &AccountRecord) -> Result<(), DirectoryError> {
        self.store
            .create_document(&self.collection, record.id.as_str(), record.to_fields())
            .await
    }

    /// Writes only the `status` field.
    pub async fn set_status(&self, id: &AccountId, status: AccountStatus) -> Result<(), DirectoryError> {
        let mut partial = Fields::new();
        partial.insert(fields::STATUS.to_string(), Value::from(status.as_str()));
        self.store.write(&self.collection, id.as_str(), partial).await
    }

    /// Writes only the `lastLogin` field.
    pub async fn touch_last_login(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), DirectoryError> {
        let mut partial = Fields::new();
        partial.insert(fields::LAST_LOGIN.to_string(), Value::from(at.to_rfc3339_opts(SecondsFormat::AutoSi, true)));
        self.store.write(&self.collection, id.as_str(), partial).await
    }

    pub async fn delete(&self, id: &AccountId) -> Result<(), DirectoryError> {
        self.store.remove(&self.collection, id.as_str()).await
    }
}
