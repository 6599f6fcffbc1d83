use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deskline_core::{
    create_notifier, load_config, run_logger, validate_config, DeskEvent, HttpTicketStore,
    TicketDesk, TicketQuery, TicketStore,
};

use deskline_server::api::create_router;
use deskline_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("DESKLINE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Ticket store: {}", config.store.base_url);

    // Compute config hash for the startup event
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create the ticket store client
    let store: Arc<dyn TicketStore> = Arc::new(
        HttpTicketStore::new(config.store.clone()).context("Failed to create ticket store")?,
    );
    info!("Ticket store client initialized");

    // Create the desk event channel and its log consumer
    let (notify, notify_rx) = create_notifier(config.events.buffer);
    let logger_handle = tokio::spawn(run_logger(notify_rx));

    // Create the desk and load the initial collection.
    // A failed initial fetch is not fatal: the server starts with an empty
    // collection and the next successful list request fills it.
    let desk = Arc::new(TicketDesk::new(store, notify.clone()));
    if let Err(e) = desk.refresh(&TicketQuery::new()).await {
        warn!("Initial ticket fetch failed: {}", e);
    } else {
        info!("Loaded {} tickets", desk.tickets().await.len());
    }

    notify
        .emit(DeskEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Build the router and serve
    let app_state = Arc::new(AppState::new(config.clone(), desk));
    let app = create_router(app_state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    notify
        .emit(DeskEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Drop the last notify handle so the logger's channel closes, then wait
    // for it to drain.
    drop(notify);
    let _ = logger_handle.await;
    info!("Event logger stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
