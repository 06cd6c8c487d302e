//! Domain layer types for the Mailmind client.
//!
//! This module contains the core domain types used throughout the application,
//! including session, user, email, and assistant entities.

mod assistant;
mod email;
mod session;
mod types;
mod user;

pub use assistant::{AskAnswer, ModelBackend};
pub use email::{Address, EmailMessage};
pub use session::{Route, SessionState};
pub use types::{MessageId, UserId};
pub use user::{AuthProvider, UserIdentity};
