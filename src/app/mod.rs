//! Application facade and state.
//!
//! [`AssistantApp`] wires settings, credential storage, the API client,
//! and the services into one object a front end can drive. It owns the
//! [`AppState`] snapshot; callers mutate through methods and observe
//! through [`AssistantApp::state`] and [`AssistantApp::subscribe`].

mod state;

pub use state::AppState;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, RwLock};
use url::Url;

use crate::api::{ApiClient, AssistantApi, AuthApi, MailApi};
use crate::config::Settings;
use crate::domain::{AskAnswer, AuthProvider, EmailMessage, ModelBackend, Route};
use crate::services::{
    AssistantService, CallbackOutcome, CallbackService, EmailService, SessionEvent, SessionService,
};
use crate::storage::{CredentialStore, FileTokenStore, KeychainAccess, TokenStore};

/// Top-level application object.
///
/// Generic over the two credential stores so tests can run against
/// in-memory storage; production code uses the OS keychain and the
/// file-backed backup via [`AssistantApp::new`].
pub struct AssistantApp<C = KeychainAccess, B = FileTokenStore> {
    api: Arc<ApiClient>,
    session: Arc<SessionService<C, B>>,
    callbacks: CallbackService<C, B>,
    emails: EmailService,
    assistant: AssistantService,
    state: RwLock<AppState>,
    email_limit: u32,
}

impl AssistantApp {
    /// Creates the production application from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let canonical = KeychainAccess::with_service(&settings.session.keychain_service);
        let backup = FileTokenStore::in_data_dir()
            .context("no data directory available for the backup token file")?;
        Self::with_stores(settings, canonical, backup)
    }
}

impl<C: CredentialStore, B: CredentialStore> AssistantApp<C, B> {
    /// Creates the application over the given credential stores.
    pub fn with_stores(settings: &Settings, canonical: C, backup: B) -> Result<Self> {
        let base_url = Url::parse(&settings.backend.base_url)
            .with_context(|| format!("invalid backend base url: {}", settings.backend.base_url))?;
        let http = reqwest::Client::builder()
            .timeout(settings.backend.request_timeout)
            .build()
            .context("failed to build the http client")?;
        let api = Arc::new(ApiClient::new(base_url).with_client(http));

        let session = Arc::new(SessionService::new(
            TokenStore::new(canonical, backup),
            Arc::clone(&api) as Arc<dyn AuthApi>,
        ));
        let callbacks = CallbackService::new(Arc::clone(&session)).with_timing(
            settings.session.confirm_timeout,
            settings.session.confirm_poll_interval,
        );
        let emails = EmailService::new(Arc::clone(&api) as Arc<dyn MailApi>);
        let assistant = AssistantService::new(Arc::clone(&api) as Arc<dyn AssistantApi>);

        Ok(Self {
            api,
            session,
            callbacks,
            emails,
            assistant,
            state: RwLock::new(AppState::new(settings.assistant.default_model)),
            email_limit: settings.assistant.email_limit,
        })
    }

    /// Restores the session on launch and returns the screen to show.
    pub async fn start(&self) -> Route {
        let session = self.session.restore().await;
        let mut state = self.state.write().await;
        state.apply_session(session);
        state.route()
    }

    /// Handles a login redirect URL and returns where to navigate.
    pub async fn handle_callback(&self, url: &str) -> CallbackOutcome {
        let outcome = self.callbacks.handle(url).await;
        let session = self.session.state().await;

        let mut state = self.state.write().await;
        state.apply_session(session);
        state.apply_callback(&outcome);
        outcome
    }

    /// Builds the URL to open in a browser to start a login.
    pub fn login_url(&self, provider: AuthProvider) -> Result<Url> {
        Ok(self.api.login_url(provider)?)
    }

    /// Signs out and returns to the login screen.
    pub async fn logout(&self) {
        self.session.logout().await;
        let session = self.session.state().await;
        self.state.write().await.apply_session(session);
    }

    /// Fetches the recent inbox and stores it in the application state.
    pub async fn refresh_inbox(&self) -> Result<Vec<EmailMessage>> {
        let messages = self.emails.recent(self.email_limit).await?;
        self.state.write().await.set_messages(messages.clone());
        Ok(messages)
    }

    /// Asks the assistant a question with the selected model.
    pub async fn ask(&self, question: &str) -> Result<AskAnswer> {
        let model = self.state.read().await.selected_model;
        let answer = self.assistant.ask(question, model).await?;
        self.state.write().await.set_answer(answer.clone());
        Ok(answer)
    }

    /// Selects the model backend for future questions.
    pub async fn select_model(&self, model: ModelBackend) {
        self.state.write().await.select_model(model);
    }

    /// Returns a snapshot of the application state.
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Returns the session service, for components that only need the session.
    pub fn session(&self) -> &Arc<SessionService<C, B>> {
        &self.session
    }
}
