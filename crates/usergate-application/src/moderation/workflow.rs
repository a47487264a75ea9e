use super::report::{BatchAction, BatchReport};
use super::selection::SelectionSet;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use usergate_core::account::{AccountDirectory, AccountId, AccountRecord};
use usergate_core::session::SessionStore;
use usergate_core::{CredentialError, DirectoryError, Route};

pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationState {
    /// Created, account list not fetched yet.
    Loading,
    Ready,
    /// The session ended; no further mutations are accepted.
    SignedOut,
}

impl fmt::Display for ModerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModerationState::Loading => "loading",
            ModerationState::Ready => "ready",
            ModerationState::SignedOut => "signed out",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModerationError {
    #[error("moderation list is {0}")]
    NotReady(ModerationState),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// The administrator's account list: fetch, select, and mutate in batches.
pub struct ModerationWorkflow {
    session: Arc<SessionStore>,
    directory: AccountDirectory,
    state: ModerationState,
    accounts: Vec<AccountRecord>,
    selection: SelectionSet,
    batch_concurrency: usize,
}

impl ModerationWorkflow {
    pub fn new(session: Arc<SessionStore>, directory: AccountDirectory) -> Self {
        Self {
            session,
            directory,
            state: ModerationState::Loading,
            accounts: Vec::new(),
            selection: SelectionSet::new(),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Upper bound on in-flight writes per batch. Zero is treated as one.
    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = limit.max(1);
        self
    }

    pub fn state(&self) -> ModerationState {
        self.state
    }

    /// Visible accounts in display order.
    pub fn accounts(&self) -> &[AccountRecord] {
        &self.accounts
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Fetches the full account list and enters `Ready`.
    pub async fn load(&mut self) -> Result<&[AccountRecord], ModerationError> {
        if self.state == ModerationState::SignedOut {
            return Err(ModerationError::NotReady(self.state));
        }
        self.fetch().await?;
        self.state = ModerationState::Ready;
        Ok(&self.accounts)
    }

    /// Re-queries the directory, dropping selected ids that vanished.
    ///
    /// From `Loading` (a failed first fetch) this retries the initial load.
    pub async fn reload(&mut self) -> Result<&[AccountRecord], ModerationError> {
        if self.state == ModerationState::Loading {
            return self.load().await;
        }
        self.ensure_ready()?;
        self.fetch().await?;
        Ok(&self.accounts)
    }

    async fn fetch(&mut self) -> Result<(), DirectoryError> {
        let accounts = self.directory.list().await?;
        tracing::debug!(count = accounts.len(), "Fetched account list");
        self.accounts = accounts;
        let visible = &self.accounts;
        self.selection
            .retain(|id| visible.iter().any(|account| &account.id == id));
        Ok(())
    }

    /// True when every visible account is selected and there is at least one.
    pub fn all_selected(&self) -> bool {
        !self.accounts.is_empty()
            && self
                .accounts
                .iter()
                .all(|account| self.selection.contains(&account.id))
    }

    /// Selects every visible account, or none.
    pub fn toggle_all(&mut self, checked: bool) {
        if checked {
            self.selection
                .select_all(self.accounts.iter().map(|account| &account.id));
        } else {
            self.selection.clear();
        }
    }

    /// Flips selection of a visible account. Returns whether it is selected
    /// afterwards; unknown ids are ignored.
    pub fn toggle_one(&mut self, id: &AccountId) -> bool {
        if !self.accounts.iter().any(|account| &account.id == id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub async fn block(&mut self) -> Result<BatchReport, ModerationError> {
        self.run_batch(BatchAction::Block).await
    }

    pub async fn unblock(&mut self) -> Result<BatchReport, ModerationError> {
        self.run_batch(BatchAction::Unblock).await
    }

    pub async fn delete(&mut self) -> Result<BatchReport, ModerationError> {
        self.run_batch(BatchAction::Delete).await
    }

    /// Ends the session and returns the route to show next.
    pub async fn logout(&mut self) -> Result<Route, ModerationError> {
        self.session.sign_out().await?;
        self.state = ModerationState::SignedOut;
        Ok(Route::SignIn)
    }

    fn ensure_ready(&self) -> Result<(), ModerationError> {
        match self.state {
            ModerationState::Ready => Ok(()),
            other => Err(ModerationError::NotReady(other)),
        }
    }

    async fn run_batch(&mut self, action: BatchAction) -> Result<BatchReport, ModerationError> {
        self.ensure_ready()?;

        let targets: Vec<AccountId> = self.selection.iter().cloned().collect();
        let own_id = self.session.current().map(|identity| identity.uid);
        let self_targeted = action.evicts_self()
            && own_id.as_ref().is_some_and(|id| self.selection.contains(id));

        let mut report = BatchReport::new(action);
        if targets.is_empty() {
            return Ok(report);
        }

        let directory = self.directory.clone();
        let mut writes = stream::iter(targets)
            .map(|id| {
                let directory = directory.clone();
                async move {
                    let result = match action.target_status() {
                        Some(status) => directory.set_status(&id, status).await,
                        None => directory.delete(&id).await,
                    };
                    (id, result)
                }
            })
            .buffer_unordered(self.batch_concurrency);

        while let Some((id, result)) = writes.next().await {
            match result {
                Ok(()) => {
                    self.apply(action, &id);
                    report.succeeded.push(id);
                }
                Err(e) => {
                    tracing::warn!(uid = %id, action = %action, "Batch write failed: {}", e);
                    report.failed.push((id, e));
                }
            }
        }
        drop(writes);

        report.succeeded.sort();
        report.failed.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::info!("{}", report);

        let self_applied = own_id
            .as_ref()
            .is_some_and(|id| report.succeeded.contains(id));
        if self_targeted && self_applied {
            match self.session.sign_out().await {
                Ok(cleared) => report.signed_out = cleared,
                Err(e) => tracing::error!("Failed to sign out after self-{}: {}", action, e),
            }
            self.state = ModerationState::SignedOut;
            report.navigation = Some(Route::SignIn);
        }

        Ok(report)
    }

    /// Reflects one successful write in the display list.
    fn apply(&mut self, action: BatchAction, id: &AccountId) {
        match action.target_status() {
            Some(status) => {
                if let Some(account) = self.accounts.iter_mut().find(|account| &account.id == id) {
                    account.status = status;
                }
            }
            None => {
                self.accounts.retain(|account| &account.id != id);
                self.selection.remove(id);
            }
        }
    }
}
