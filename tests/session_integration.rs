//! Integration tests for the session lifecycle.
//!
//! These tests drive the crate through its public surface: the token
//! store, the session restorer, the login redirect handler, and the
//! thin email/assistant services. Backend and storage are substituted
//! with programmable fakes; unit tests inside each module cover the
//! finer-grained logic.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use tokio_test::assert_ok;

use mailmind::api::{
    ApiError, ApiResult, AskRequest, AssistantApi, AuthApi, IdentityEnvelope, MailApi,
};
use mailmind::domain::{
    Address, AskAnswer, AuthProvider, EmailMessage, MessageId, ModelBackend, Route, SessionState,
    UserId, UserIdentity,
};
use mailmind::services::{
    AssistantService, CallbackOutcome, CallbackService, EmailService, SessionService,
};
use mailmind::storage::{CredentialStore, StorageError, StorageResult, TokenStore, TOKEN_KEY};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Clone, Default)]
struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn is_empty(&self) -> bool {
        self.values.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Accepts nothing and holds nothing.
#[derive(Clone, Default)]
struct DeadStore;

#[async_trait]
impl CredentialStore for DeadStore {
    async fn store(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("dead store".into()))
    }

    async fn retrieve(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

struct StubBackend {
    bearer: Mutex<Option<String>>,
    identity_replies: Mutex<VecDeque<ApiResult<IdentityEnvelope>>>,
    fetch_calls: AtomicU32,
}

impl StubBackend {
    fn with_replies(replies: Vec<ApiResult<IdentityEnvelope>>) -> Arc<Self> {
        Arc::new(Self {
            bearer: Mutex::new(None),
            identity_replies: Mutex::new(replies.into()),
            fetch_calls: AtomicU32::new(0),
        })
    }

    fn bearer(&self) -> Option<String> {
        self.bearer.lock().unwrap().clone()
    }

    fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for StubBackend {
    fn set_bearer(&self, token: Option<&str>) {
        *self.bearer.lock().unwrap() = token.map(str::to_owned);
    }

    async fn fetch_identity(&self) -> ApiResult<IdentityEnvelope> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.identity_replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected identity fetch")
    }

    async fn logout(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Mail endpoint that reports what limit it was asked for.
struct StubMail {
    messages: Vec<EmailMessage>,
    last_limit: AtomicU32,
}

#[async_trait]
impl MailApi for StubMail {
    async fn recent_messages(&self, limit: u32) -> ApiResult<Vec<EmailMessage>> {
        self.last_limit.store(limit, Ordering::SeqCst);
        Ok(self.messages.clone())
    }
}

/// Assistant endpoint that echoes the question back.
struct EchoAssistant;

#[async_trait]
impl AssistantApi for EchoAssistant {
    async fn ask(&self, request: AskRequest) -> ApiResult<AskAnswer> {
        Ok(AskAnswer {
            text: format!("echo: {}", request.question),
            model: request.model,
        })
    }
}

fn ada() -> UserIdentity {
    UserIdentity {
        id: UserId::from("u1"),
        email: "ada@example.com".to_string(),
        provider: AuthProvider::Google,
        name: Some("Ada".to_string()),
        picture: None,
        access_token: None,
        refresh_token: None,
    }
}

fn verified() -> ApiResult<IdentityEnvelope> {
    Ok(IdentityEnvelope {
        success: true,
        user: Some(ada()),
    })
}

struct Harness {
    session: Arc<SessionService<MemoryStore, MemoryStore>>,
    backend: Arc<StubBackend>,
    canonical: MemoryStore,
    backup: MemoryStore,
}

fn harness(replies: Vec<ApiResult<IdentityEnvelope>>) -> Harness {
    let canonical = MemoryStore::default();
    let backup = MemoryStore::default();
    let backend = StubBackend::with_replies(replies);
    let session = Arc::new(SessionService::new(
        TokenStore::new(canonical.clone(), backup.clone()),
        backend.clone() as Arc<dyn AuthApi>,
    ));
    Harness {
        session,
        backend,
        canonical,
        backup,
    }
}

// ============================================================================
// Token persistence through the session service
// ============================================================================

#[tokio::test]
async fn set_token_round_trips_through_canonical_storage() {
    let h = harness(vec![verified()]);

    assert!(h.session.set_token("abc123").await.unwrap());

    assert_eq!(h.canonical.value(TOKEN_KEY), Some("abc123".to_string()));
    assert_eq!(h.backup.value(TOKEN_KEY), Some("abc123".to_string()));
    assert_ok!(h.session.tokens().issued_at().await);
}

#[tokio::test]
async fn empty_token_changes_nothing() {
    let h = harness(vec![]);

    assert!(!h.session.set_token("").await.unwrap());

    assert!(h.canonical.is_empty());
    assert!(h.backup.is_empty());
    assert_eq!(h.backend.fetch_calls(), 0);
}

// ============================================================================
// Session restoration
// ============================================================================

#[tokio::test]
async fn fresh_token_authenticates_and_identity_matches() {
    let h = harness(vec![verified()]);

    h.session.set_token("abc123").await.unwrap();

    match h.session.state().await {
        SessionState::Authenticated(user) => {
            assert_eq!(user.email, "ada@example.com");
            assert_eq!(user.provider, AuthProvider::Google);
        }
        other => panic!("expected authenticated session, got {other}"),
    }
    assert_eq!(h.backend.bearer(), Some("abc123".to_string()));
    assert_eq!(h.session.route().await, Route::Dashboard);
}

#[tokio::test]
async fn rejected_token_empties_both_stores() {
    let h = harness(vec![Err(ApiError::Rejected { status: 401 })]);
    h.canonical.store(TOKEN_KEY, "dead").await.unwrap();
    h.backup.store(TOKEN_KEY, "dead").await.unwrap();

    let state = h.session.restore().await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(h.canonical.is_empty());
    assert!(h.backup.is_empty());
    assert_eq!(h.session.route().await, Route::Login);
}

#[tokio::test]
async fn server_error_keeps_token_and_session_open() {
    let h = harness(vec![Err(ApiError::Api {
        status: 500,
        message: "backend down".to_string(),
    })]);
    h.canonical.store(TOKEN_KEY, "abc123").await.unwrap();

    let state = h.session.restore().await;

    assert_eq!(state, SessionState::Unknown);
    assert_eq!(h.canonical.value(TOKEN_KEY), Some("abc123".to_string()));
    assert!(h.session.last_error().await.is_some());
    // The retry affordance: a later restore with a healthy backend succeeds.
}

#[tokio::test]
async fn backup_copy_recovers_a_lost_canonical_token() {
    let h = harness(vec![verified()]);
    h.backup.store(TOKEN_KEY, "abc123").await.unwrap();

    let state = h.session.restore().await;

    assert!(state.is_authenticated());
    assert_eq!(h.canonical.value(TOKEN_KEY), Some("abc123".to_string()));
}

#[tokio::test]
async fn double_restore_is_idempotent() {
    let h = harness(vec![verified(), verified()]);
    h.canonical.store(TOKEN_KEY, "abc123").await.unwrap();

    let first = h.session.restore().await;
    let second = h.session.restore().await;

    assert_eq!(first, second);
    assert!(second.is_authenticated());
    assert_eq!(h.backend.fetch_calls(), 2);
}

// ============================================================================
// Login redirect handling
// ============================================================================

#[tokio::test]
async fn redirect_with_token_confirms_and_reaches_dashboard() {
    let h = harness(vec![verified()]);
    let callbacks = CallbackService::new(Arc::clone(&h.session));

    let outcome = callbacks
        .handle("mailmind://auth-callback?token=abc123")
        .await;

    assert_eq!(outcome, CallbackOutcome::Dashboard);
    assert_eq!(h.canonical.value(TOKEN_KEY), Some("abc123".to_string()));
    assert!(h.session.state().await.is_authenticated());
}

#[tokio::test]
async fn redirect_without_token_writes_nothing() {
    let h = harness(vec![]);
    let callbacks = CallbackService::new(Arc::clone(&h.session));

    let outcome = callbacks.handle("mailmind://auth-callback").await;

    assert_eq!(outcome, CallbackOutcome::Login);
    assert!(h.canonical.is_empty());
    assert!(h.backup.is_empty());
    assert_eq!(h.backend.fetch_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn unconfirmable_write_with_failed_recovery_reports_an_error() {
    let backend = StubBackend::with_replies(vec![]);
    let session = Arc::new(SessionService::new(
        TokenStore::new(DeadStore, DeadStore),
        backend.clone() as Arc<dyn AuthApi>,
    ));
    let callbacks = CallbackService::new(Arc::clone(&session))
        .with_timing(Duration::from_millis(500), Duration::from_millis(25));

    let outcome = callbacks
        .handle("mailmind://auth-callback?token=abc123")
        .await;

    let error = outcome.error().expect("an error message for the login screen");
    assert!(!error.is_empty());
    assert_eq!(outcome.route(), Route::Login);
    assert_eq!(backend.fetch_calls(), 0);
}

// ============================================================================
// Email listing and assistant questions
// ============================================================================

#[tokio::test]
async fn email_service_lists_recent_messages() {
    let mail = Arc::new(StubMail {
        messages: vec![EmailMessage {
            id: MessageId::from("m1"),
            from: Address::with_name("boss@example.com", "The Boss"),
            subject: Some("Quarterly numbers".to_string()),
            snippet: "Please review".to_string(),
            received_at: Utc::now(),
            is_read: false,
        }],
        last_limit: AtomicU32::new(0),
    });
    let service = EmailService::new(mail.clone());

    let messages = service.recent(10).await.unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].subject_or_default(), "Quarterly numbers");
    assert_eq!(mail.last_limit.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn assistant_routes_question_to_selected_model() {
    let service = AssistantService::new(Arc::new(EchoAssistant));

    let answer = service
        .ask("what is due today?", ModelBackend::Anthropic)
        .await
        .unwrap();

    assert_eq!(answer.text, "echo: what is due today?");
    assert_eq!(answer.model, ModelBackend::Anthropic);
}

#[tokio::test]
async fn assistant_rejects_blank_questions_locally() {
    let service = AssistantService::new(Arc::new(EchoAssistant));
    assert!(service.ask("   ", ModelBackend::OpenAi).await.is_err());
}
