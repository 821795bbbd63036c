// This is the entry point of the startup platform service.
//
// **Architecture Overview:**
// - `core/` = Business logic (transport-agnostic)
// - `infra/` = Implementations of core traits (databases, APIs)
// - `web/` = HTTP adapters (axum routes)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve the HTTP API until shutdown

mod config;
// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

use crate::config::AppConfig;
use crate::core::approval::{ApprovalService, SweepPolicy};
use crate::core::contacts::ContactService;
use crate::core::investments::InvestmentService;
use crate::core::moderation::{ContentClassifier, ModerationService};
use crate::core::saved_startups::SavedStartupService;
use crate::infra::ai::GeminiClient;
use crate::infra::contacts::SqliteContactStore;
use crate::infra::database::Database;
use crate::infra::investments::SqliteInvestmentStore;
use crate::infra::saved_startups::SqliteSavedStartupStore;
use crate::infra::startups::SqliteStartupStore;
use crate::web::AppState;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    // One lazily connected handle shared by every store
    let db = Arc::new(Database::new(config.database_url.clone()));

    let startup_store = SqliteStartupStore::new(Arc::clone(&db));
    startup_store
        .migrate()
        .await
        .context("Failed to migrate startups table")?;

    let contact_store = SqliteContactStore::new(Arc::clone(&db));
    contact_store
        .migrate()
        .await
        .context("Failed to migrate contacts tables")?;

    let saved_store = SqliteSavedStartupStore::new(Arc::clone(&db));
    saved_store
        .migrate()
        .await
        .context("Failed to migrate saved startups table")?;

    let investment_store = SqliteInvestmentStore::new(Arc::clone(&db));
    investment_store
        .migrate()
        .await
        .context("Failed to migrate investments table")?;

    // Moderation classifier
    let mut gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_timeout,
    )
    .context("Failed to create Gemini client")?;
    if let Some(base_url) = &config.gemini_base_url {
        gemini = gemini.with_base_url(base_url.clone());
    }
    let classifier: Box<dyn ContentClassifier> = Box::new(gemini);

    let approval = Arc::new(ApprovalService::new(
        startup_store,
        ModerationService::new(classifier),
        SweepPolicy::with_delay_minutes(config.auto_approve_delay_mins),
    ));

    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET is not set; the approval trigger will reject every call");
    }

    let state = AppState {
        approval,
        contacts: Arc::new(ContactService::new(contact_store)),
        saved_startups: Arc::new(SavedStartupService::new(saved_store)),
        investments: Arc::new(InvestmentService::new(investment_store)),
        cron_secret: config.cron_secret.as_deref().map(Arc::from),
    };

    // ========================================================================
    // HTTP SERVER
    // ========================================================================

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(
        "Listening on {} (model {}, auto-approve after {} minutes)",
        config.bind_addr,
        config.gemini_model,
        config.auto_approve_delay_mins
    );

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    db.teardown().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            // Without a signal handler, run until killed.
            std::future::pending::<()>().await;
        }
    }
}
