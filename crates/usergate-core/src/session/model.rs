use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// The signed-in identity issued by the credential service.
///
/// `uid` is the same identifier under which the account profile is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: AccountId,
    pub email: String,
}

impl Identity {
    pub fn new(uid: impl Into<AccountId>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}
