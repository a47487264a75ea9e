use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use usergate_application::{
    BatchAction, ModerationError, ModerationState, ModerationWorkflow, RegistrationUseCase,
};
use usergate_core::account::{AccountDirectory, AccountId, AccountRecord, AccountStatus};
use usergate_core::document::{Document, DocumentStore, Fields, Query};
use usergate_core::session::SessionStore;
use usergate_core::{DirectoryError, Route};
use usergate_infrastructure::{InMemoryDocumentStore, LocalCredentialService};

/// Wraps the in-memory store, recording partial writes and rejecting some ids.
#[derive(Default)]
struct RecordingStore {
    inner: InMemoryDocumentStore,
    rejected: HashSet<String>,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn rejecting(ids: &[&str]) -> Self {
        Self {
            rejected: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DirectoryError> {
        self.inner.query(collection, query).await
    }

    async fn read_document(&self, collection: &str, id: &str) -> Result<Option<Fields>, DirectoryError> {
        self.inner.read_document(collection, id).await
    }

    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), DirectoryError> {
        self.inner.create_document(collection, id, fields).await
    }

    async fn write(&self, collection: &str, id: &str, partial: Fields) -> Result<(), DirectoryError> {
        self.writes.lock().unwrap().push(id.to_string());
        if self.rejected.contains(id) {
            return Err(DirectoryError::unavailable("write rejected"));
        }
        self.inner.write(collection, id, partial).await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), DirectoryError> {
        if self.rejected.contains(id) {
            return Err(DirectoryError::unavailable("remove rejected"));
        }
        self.inner.remove(collection, id).await
    }
}

struct Fixture {
    session: Arc<SessionStore>,
    directory: AccountDirectory,
    store: Arc<RecordingStore>,
}

impl Fixture {
    fn new(store: RecordingStore) -> Self {
        let store = Arc::new(store);
        let credentials = Arc::new(LocalCredentialService::in_memory(6));
        Self {
            session: Arc::new(SessionStore::new(credentials)),
            directory: AccountDirectory::new(store.clone(), "users"),
            store,
        }
    }

    async fn seed(&self, id: &str, email: &str, status: AccountStatus) {
        let mut record = AccountRecord::registered(AccountId::new(id), id, email, Utc::now());
        record.status = status;
        self.directory.create(&record).await.unwrap();
    }

    /// Registers the administrator, which also signs them in.
    async fn register_admin(&self) -> AccountId {
        let registration = RegistrationUseCase::new(self.session.clone(), self.directory.clone());
        registration
            .register("Admin", "admin@x.com", "secret1")
            .await
            .unwrap()
            .account
            .id
    }

    async fn workflow(&self) -> ModerationWorkflow {
        let mut workflow = ModerationWorkflow::new(self.session.clone(), self.directory.clone());
        workflow.load().await.unwrap();
        workflow
    }
}

fn status_of(workflow: &ModerationWorkflow, id: &str) -> Option<AccountStatus> {
    workflow
        .accounts()
        .iter()
        .find(|account| account.id.as_str() == id)
        .map(|account| account.status)
}

#[tokio::test]
async fn test_load_orders_by_email_then_status() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    fixture.seed("u1", "a@x.com", AccountStatus::Blocked).await;

    let workflow = fixture.workflow().await;
    let emails: Vec<&str> = workflow.accounts().iter().map(|a| a.email.as_str()).collect();
    assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
    assert_eq!(workflow.state(), ModerationState::Ready);
}

#[tokio::test]
async fn test_mutations_before_load_are_refused() {
    let fixture = Fixture::new(RecordingStore::default());
    let mut workflow = ModerationWorkflow::new(fixture.session.clone(), fixture.directory.clone());

    assert_eq!(
        workflow.block().await.unwrap_err(),
        ModerationError::NotReady(ModerationState::Loading)
    );
}

#[tokio::test]
async fn test_toggle_all_then_none_restores_empty_selection() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_all(true);
    assert!(workflow.all_selected());
    assert_eq!(workflow.selection().len(), 2);

    workflow.toggle_all(false);
    assert!(workflow.selection().is_empty());
    assert!(!workflow.all_selected());
}

#[tokio::test]
async fn test_toggle_one_ignores_unknown_ids() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    let mut workflow = fixture.workflow().await;

    assert!(!workflow.toggle_one(&AccountId::new("ghost")));
    assert!(workflow.selection().is_empty());

    assert!(workflow.toggle_one(&AccountId::new("u1")));
    assert!(!workflow.toggle_one(&AccountId::new("u1")));
}

#[tokio::test]
async fn test_block_marks_exactly_the_selected_records() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    fixture.seed("u3", "c@x.com", AccountStatus::Active).await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_one(&AccountId::new("u1"));
    workflow.toggle_one(&AccountId::new("u3"));
    let report = workflow.block().await.unwrap();

    assert_eq!(report.action, BatchAction::Block);
    assert_eq!(report.succeeded, vec![AccountId::new("u1"), AccountId::new("u3")]);
    assert!(report.all_succeeded());
    assert_eq!(report.navigation, None);
    assert_eq!(status_of(&workflow, "u1"), Some(AccountStatus::Blocked));
    assert_eq!(status_of(&workflow, "u2"), Some(AccountStatus::Active));
    assert_eq!(status_of(&workflow, "u3"), Some(AccountStatus::Blocked));

    // Persisted, not only displayed.
    workflow.reload().await.unwrap();
    assert_eq!(status_of(&workflow, "u3"), Some(AccountStatus::Blocked));
}

#[tokio::test]
async fn test_unblock_writes_only_selected_ids() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    fixture.seed("u2", "b@x.com", AccountStatus::Blocked).await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_one(&AccountId::new("u1"));
    let report = workflow.unblock().await.unwrap();

    assert_eq!(report.succeeded, vec![AccountId::new("u1")]);
    assert_eq!(fixture.store.writes(), vec!["u1".to_string()]);
    assert_eq!(status_of(&workflow, "u1"), Some(AccountStatus::Active));
    assert_eq!(status_of(&workflow, "u2"), Some(AccountStatus::Blocked));
}

#[tokio::test]
async fn test_partial_failure_is_reported_and_only_successes_applied() {
    let fixture = Fixture::new(RecordingStore::rejecting(&["u2"]));
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    fixture.seed("u3", "c@x.com", AccountStatus::Active).await;
    let mut workflow = fixture.workflow().await.with_batch_concurrency(2);

    workflow.toggle_all(true);
    let report = workflow.block().await.unwrap();

    assert!(report.is_partial());
    assert_eq!(report.succeeded, vec![AccountId::new("u1"), AccountId::new("u3")]);
    let failed: Vec<&AccountId> = report.failed_ids().collect();
    assert_eq!(failed, vec![&AccountId::new("u2")]);
    assert_eq!(status_of(&workflow, "u1"), Some(AccountStatus::Blocked));
    assert_eq!(status_of(&workflow, "u2"), Some(AccountStatus::Active));
    assert_eq!(status_of(&workflow, "u3"), Some(AccountStatus::Blocked));
    // No rollback of the applied writes.
    workflow.reload().await.unwrap();
    assert_eq!(status_of(&workflow, "u1"), Some(AccountStatus::Blocked));
}

#[tokio::test]
async fn test_self_block_signs_out_once_and_navigates_to_entry() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    let admin = fixture.register_admin().await;
    let mut workflow = fixture.workflow().await;
    let mut observer = fixture.session.subscribe();

    workflow.toggle_one(&admin);
    workflow.toggle_one(&AccountId::new("u1"));
    let report = workflow.block().await.unwrap();

    assert!(report.signed_out);
    assert_eq!(report.navigation, Some(Route::SignIn));
    assert_eq!(workflow.state(), ModerationState::SignedOut);
    assert!(fixture.session.current().is_none());

    assert_eq!(observer.changed().await, Some(None));
    assert!(!observer.has_changed());

    // A second sign-out is a no-op.
    assert!(!fixture.session.sign_out().await.unwrap());
    assert!(!observer.has_changed());

    assert_eq!(
        workflow.delete().await.unwrap_err(),
        ModerationError::NotReady(ModerationState::SignedOut)
    );
}

#[tokio::test]
async fn test_failed_self_block_keeps_session() {
    let fixture = Fixture::new(RecordingStore::default());
    let admin = fixture.register_admin().await;
    let mut workflow = fixture.workflow().await;

    // The admin's document vanishes before the batch, so the write fails.
    fixture.store.inner.remove("users", admin.as_str()).await.unwrap();
    workflow.toggle_one(&admin);
    let report = workflow.block().await.unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(!report.signed_out);
    assert_eq!(report.navigation, None);
    assert!(fixture.session.current().is_some());
    assert_eq!(workflow.state(), ModerationState::Ready);
}

#[tokio::test]
async fn test_unblock_self_does_not_sign_out() {
    let fixture = Fixture::new(RecordingStore::default());
    let admin = fixture.register_admin().await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_one(&admin);
    let report = workflow.unblock().await.unwrap();

    assert!(!report.signed_out);
    assert!(fixture.session.is_signed_in());
}

#[tokio::test]
async fn test_delete_including_self_removes_both_and_signs_out() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    let admin = fixture.register_admin().await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_one(&admin);
    workflow.toggle_one(&AccountId::new("u2"));
    let report = workflow.delete().await.unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert!(workflow.accounts().is_empty());
    assert!(workflow.selection().is_empty());
    assert_eq!(fixture.store.inner.len("users").await, 0);
    assert!(report.signed_out);
    assert_eq!(report.navigation, Some(Route::SignIn));
}

#[tokio::test]
async fn test_reload_prunes_vanished_selection() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.seed("u1", "a@x.com", AccountStatus::Active).await;
    fixture.seed("u2", "b@x.com", AccountStatus::Active).await;
    let mut workflow = fixture.workflow().await;

    workflow.toggle_all(true);
    fixture.directory.delete(&AccountId::new("u2")).await.unwrap();
    workflow.reload().await.unwrap();

    assert_eq!(workflow.accounts().len(), 1);
    assert_eq!(workflow.selection().len(), 1);
    assert!(workflow.all_selected());
}

#[tokio::test]
async fn test_logout_returns_entry_route() {
    let fixture = Fixture::new(RecordingStore::default());
    fixture.register_admin().await;
    let mut workflow = fixture.workflow().await;

    assert_eq!(workflow.logout().await.unwrap(), Route::SignIn);
    assert!(!fixture.session.is_signed_in());
    assert_eq!(workflow.state(), ModerationState::SignedOut);
}
