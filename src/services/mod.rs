//! Business services layer.
//!
//! Services sit between the application facade and the infrastructure
//! layer (API client, credential storage):
//!
//! ```text
//! Application Layer (facade, state)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (API client, storage)
//! ```
//!
//! # Services Overview
//!
//! - [`SessionService`]: owns the session token and authentication state
//! - [`CallbackService`]: turns login redirect URLs into navigation decisions
//! - [`EmailService`]: lists recent messages from the backend
//! - [`AssistantService`]: submits questions to the selected LLM backend

mod assistant_service;
mod callback_service;
mod email_service;
mod session_service;

pub use assistant_service::{AssistantError, AssistantResult, AssistantService};
pub use callback_service::{CallbackOutcome, CallbackService};
pub use email_service::{EmailError, EmailResult, EmailService};
pub use session_service::{SessionError, SessionEvent, SessionResult, SessionService};
