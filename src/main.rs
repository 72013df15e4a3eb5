//! Busload occupancy push relay.
//!
//! Main entry point for the relay. Initializes all subsystems and
//! coordinates graceful startup and shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use busload_api::{AppState, Config};
use busload_core::storage::{client::SupabaseClient, Storage};
use busload_notify::{Notifier, NotifyClient};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    // The merged RUST_LOG value drives the subscriber, so config.toml
    // overrides apply alongside the environment.
    init_tracing(&config.rust_log);

    info!("Starting busload occupancy push relay");
    info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        webhook_configured = config.frontend_webhook_url.is_some(),
        "Configuration loaded"
    );

    let supabase = SupabaseClient::new(config.to_supabase_config())
        .context("failed to build storage client")?;
    let storage = Storage::new(supabase);

    if let Err(e) = storage.health_check().await {
        warn!(error = %e, "storage is not reachable at startup, continuing anyway");
    } else {
        info!("Storage connection verified");
    }

    let notify_client =
        NotifyClient::new(config.to_client_config()).context("failed to build webhook client")?;
    let notifier = Notifier::new(
        notify_client,
        config.frontend_webhook_url.clone(),
        config.webhook_secret.clone(),
    );

    let addr = config.parse_server_addr()?;
    let state = AppState { config: Arc::new(config), storage, notifier: notifier.clone() };

    busload_api::start_server(state, addr).await.context("server failed")?;

    // Drain in-flight webhook dispatches before exiting.
    info!("Draining in-flight webhook notifications");
    notifier.shutdown().await;

    info!("Busload shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter directives.
fn init_tracing(directives: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
