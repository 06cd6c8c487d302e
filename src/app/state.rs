//! Application state management.
//!
//! Centralized, observable-by-snapshot state for the Mailmind client:
//! the session, the screen it maps to, the selected assistant model,
//! and the data currently on display. All mutation goes through
//! methods; presentation layers read snapshots and re-render on
//! session events.

use crate::domain::{AskAnswer, EmailMessage, ModelBackend, Route, SessionState};
use crate::services::CallbackOutcome;

/// Global application state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Current session state.
    pub session: SessionState,
    /// Error to show on the login screen, if the last login attempt failed.
    pub login_error: Option<String>,
    /// Model backend the assistant should use.
    pub selected_model: ModelBackend,
    /// Messages currently shown in the inbox list.
    pub messages: Vec<EmailMessage>,
    /// Most recent assistant answer.
    pub last_answer: Option<AskAnswer>,
}

impl AppState {
    /// Creates state with the given default model selection.
    pub fn new(selected_model: ModelBackend) -> Self {
        Self {
            selected_model,
            ..Default::default()
        }
    }

    /// Returns the screen the application should display.
    pub fn route(&self) -> Route {
        self.session.route()
    }

    /// Applies a new session state.
    ///
    /// Reaching an authenticated session clears any stale login error;
    /// losing the session drops the data that belonged to it.
    pub fn apply_session(&mut self, session: SessionState) {
        match &session {
            SessionState::Authenticated(_) => self.login_error = None,
            SessionState::Unauthenticated => {
                self.messages.clear();
                self.last_answer = None;
            }
            SessionState::Unknown => {}
        }
        self.session = session;
    }

    /// Applies the outcome of a handled login redirect.
    pub fn apply_callback(&mut self, outcome: &CallbackOutcome) {
        self.login_error = outcome.error().map(str::to_owned);
    }

    /// Selects the model backend for future questions.
    pub fn select_model(&mut self, model: ModelBackend) {
        self.selected_model = model;
    }

    /// Replaces the displayed inbox list.
    pub fn set_messages(&mut self, messages: Vec<EmailMessage>) {
        self.messages = messages;
    }

    /// Records the most recent assistant answer.
    pub fn set_answer(&mut self, answer: AskAnswer) {
        self.last_answer = Some(answer);
    }
}
