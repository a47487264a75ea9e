use std::fmt;
use usergate_core::account::{AccountId, AccountStatus};
use usergate_core::{DirectoryError, Route};

/// A mutation applied to every selected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Block,
    Unblock,
    Delete,
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Block => "block",
            BatchAction::Unblock => "unblock",
            BatchAction::Delete => "delete",
        }
    }

    /// Status written by this action, if it writes one.
    pub fn target_status(&self) -> Option<AccountStatus> {
        match self {
            BatchAction::Block => Some(AccountStatus::Blocked),
            BatchAction::Unblock => Some(AccountStatus::Active),
            BatchAction::Delete => None,
        }
    }

    /// Whether applying this action to the signed-in account ends its session.
    pub fn evicts_self(&self) -> bool {
        matches!(self, BatchAction::Block | BatchAction::Delete)
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one batch. Writes are independent: a failure for one id
/// leaves the others applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub action: BatchAction,
    pub succeeded: Vec<AccountId>,
    pub failed: Vec<(AccountId, DirectoryError)>,
    /// Set when the batch forces the console elsewhere.
    pub navigation: Option<Route>,
    /// True only when this batch is the one that cleared the session.
    pub signed_out: bool,
}

impl BatchReport {
    pub fn new(action: BatchAction) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            failed: Vec::new(),
            navigation: None,
            signed_out: false,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.succeeded.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &AccountId> {
        self.failed.iter().map(|(id, _)| id)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} succeeded",
            self.action,
            self.succeeded.len(),
            self.attempted()
        )?;
        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_failures() {
        let mut report = BatchReport::new(BatchAction::Block);
        report.succeeded.push(AccountId::new("u1"));
        report
            .failed
            .push((AccountId::new("u2"), DirectoryError::unavailable("offline")));

        assert!(report.is_partial());
        assert_eq!(report.to_string(), "block: 1 of 2 succeeded, 1 failed");
    }

    #[test]
    fn test_only_block_and_delete_evict_self() {
        assert!(BatchAction::Block.evicts_self());
        assert!(BatchAction::Delete.evicts_self());
        assert!(!BatchAction::Unblock.evicts_self());
    }
}
