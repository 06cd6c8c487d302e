//! mailmind - Entry point for the assistant client shell.
//!
//! Loads settings, builds the application, optionally consumes a login
//! redirect URL passed on the command line, and restores the session.
//! A front end would take over from the concluded route; this shell
//! only reports it.

use anyhow::{Context, Result};
use mailmind::AssistantApp;

use mailmind::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting mailmind");

    let settings = Settings::load().context("failed to load settings")?;
    let app = AssistantApp::new(&settings)?;

    // A login redirect can be handed to the shell as its first argument.
    if let Some(callback_url) = std::env::args().nth(1) {
        let outcome = app.handle_callback(&callback_url).await;
        tracing::info!(route = %outcome.route(), "login redirect handled");
        if let Some(error) = outcome.error() {
            tracing::warn!("login failed: {error}");
        }
        return Ok(());
    }

    let route = app.start().await;
    tracing::info!(%route, "session restored");

    if let Some(error) = app.session().last_error().await {
        tracing::warn!("session verification was inconclusive: {error}");
    }

    Ok(())
}
