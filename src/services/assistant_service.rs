//! Ask-the-assistant orchestration.
//!
//! Questions go to the backend, which routes them to the selected LLM
//! and answers over the user's mailbox. The only local rule is that a
//! blank question never leaves the client.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::api::{ApiError, AskRequest, AssistantApi};
use crate::domain::{AskAnswer, ModelBackend};

/// Errors that can occur while asking the assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The question was empty or all whitespace.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Submits natural-language questions to the assistant backend.
pub struct AssistantService {
    api: Arc<dyn AssistantApi>,
}

impl AssistantService {
    /// Creates an assistant service over the given API seam.
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self { api }
    }

    /// Asks the assistant a question, answered by the given model.
    ///
    /// Leading and trailing whitespace is trimmed before sending; a
    /// question that trims to nothing is rejected locally.
    pub async fn ask(&self, question: &str, model: ModelBackend) -> AssistantResult<AskAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        debug!(%model, "submitting question to assistant");
        let answer = self.api.ask(AskRequest::new(question, model)).await?;
        Ok(answer)
    }
}
