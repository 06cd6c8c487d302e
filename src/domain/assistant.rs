//! Assistant domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// LLM backend the assistant endpoint should route a question to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// OpenAI hosted models.
    OpenAi,
    /// Anthropic hosted models.
    Anthropic,
    /// Locally hosted models via Ollama.
    Ollama,
}

impl ModelBackend {
    /// All selectable backends, in display order.
    pub const ALL: [ModelBackend; 3] = [
        ModelBackend::OpenAi,
        ModelBackend::Anthropic,
        ModelBackend::Ollama,
    ];

    /// Wire identifier used by the ask endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::OpenAi => "openai",
            ModelBackend::Anthropic => "anthropic",
            ModelBackend::Ollama => "ollama",
        }
    }
}

impl Default for ModelBackend {
    fn default() -> Self {
        ModelBackend::OpenAi
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An answer produced by the assistant backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskAnswer {
    /// Answer text.
    pub text: String,
    /// Backend that produced the answer.
    pub model: ModelBackend,
}
