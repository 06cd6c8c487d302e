//! mailmind - client core for an AI-assisted email assistant
//!
//! This crate implements the client side of the Mailmind assistant:
//! session and token lifecycle against the backend, recent-email
//! listing, and natural-language questions answered by a selectable
//! LLM backend. Presentation is left to a front end that observes
//! [`app::AppState`] and the session events.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod services;
pub mod storage;

pub use app::AssistantApp;
