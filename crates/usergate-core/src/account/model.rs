//! Account record domain model.
//!
//! An account record is the profile document stored for every registered
//! person. Its key equals the identity uid issued by the credential service.

use crate::document::{Document, Fields};
use crate::error::DirectoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable identifier of an account. Shared with the session identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Canonical form of an email: trimmed and lowercased.
///
/// Credentials and profile documents are keyed and compared by this form.
pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Moderation status. Exactly two values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, AccountStatus::Blocked)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored field names of an account document.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const STATUS: &str = "status";
    pub const REGISTRATION_TIME: &str = "registrationTime";
    pub const LAST_LOGIN: &str = "lastLogin";
}

/// A registered account as shown in the moderation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub status: AccountStatus,
    pub registration_time: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Wire shape of the document body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_login: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// A freshly registered account: active, both timestamps set to `now`.
    pub fn registered(
        id: AccountId,
        name: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            status: AccountStatus::Active,
            registration_time: Some(now),
            last_login: Some(now),
        }
    }

    /// Decodes a stored document.
    ///
    /// Missing name or email decode as empty strings. A missing or unknown
    /// status is rejected as malformed.
    pub fn from_document(document: Document) -> Result<Self, DirectoryError> {
        let Document { id, fields } = document;
        let body: AccountFields = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DirectoryError::malformed(id.clone(), e.to_string()))?;

        Ok(Self {
            id: AccountId(id),
            name: body.name,
            email: body.email,
            status: body.status,
            registration_time: body.registration_time,
            last_login: body.last_login,
        })
    }

    /// Encodes the record body for storage. The id is the document key.
    pub fn to_fields(&self) -> Fields {
        let body = AccountFields {
            name: self.name.clone(),
            email: self.email.clone(),
            status: self.status,
            registration_time: self.registration_time,
            last_login: self.last_login,
        };
        match serde_json::to_value(body) {
            Ok(Value::Object(map)) => map,
            // A struct of strings and timestamps always serializes to an object.
            _ => Fields::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_canonical_email() {
        assert_eq!(canonical_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(AccountStatus::Blocked).unwrap(), json!("blocked"));
        assert_eq!(AccountStatus::Active.to_string(), "active");
    }

    #[test]
    fn test_to_fields_uses_document_field_names() {
        let now = Utc::now();
        let record = AccountRecord::registered(AccountId::from("u1"), "A", "a@x.com", now);
        let stored = record.to_fields();

        assert_eq!(stored.get(fields::NAME), Some(&json!("A")));
        assert_eq!(stored.get(fields::EMAIL), Some(&json!("a@x.com")));
        assert_eq!(stored.get(fields::STATUS), Some(&json!("active")));
        assert!(stored.contains_key(fields::REGISTRATION_TIME));
        assert!(stored.contains_key(fields::LAST_LOGIN));
        assert!(!stored.contains_key("id"));
    }

    #[test]
    fn test_from_document_tolerates_missing_profile_fields() {
        let doc = Document::new("u2", as_fields(json!({"status": "blocked"})));
        let record = AccountRecord::from_document(doc).unwrap();

        assert_eq!(record.id.as_str(), "u2");
        assert_eq!(record.name, "");
        assert_eq!(record.status, AccountStatus::Blocked);
        assert!(record.last_login.is_none());
    }

    #[test]
    fn test_from_document_rejects_unknown_status() {
        let doc = Document::new("u3", as_fields(json!({"status": "suspended"})));
        let err = AccountRecord::from_document(doc).unwrap_err();
        assert!(matches!(err, DirectoryError::Malformed { ref id, .. } if id == "u3"));
    }
}
