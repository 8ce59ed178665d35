//! Session Timer - A background stopwatch with persisted session history
//!
//! This is the main entry point for the session-timer daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use session_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    store::JsonFileStore,
    tasks::keep_alive_task,
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("session_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting session-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, store={}",
          config.host, config.port, config.store.display());

    // Create application state around the persisted store
    let backend = Arc::new(JsonFileStore::new(&config.store));
    let state = Arc::new(AppState::launch(&config, backend, Arc::new(SystemClock)));

    // Keep the process visibly busy for its host runtime
    tokio::spawn(keep_alive_task(config.keep_alive_interval()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /command             - Timer command channel (start/stop/reset/getTime)");
    info!("  GET    /badge               - Current badge");
    info!("  GET    /records             - Session history");
    info!("  DELETE /records/:timestamp  - Delete a session");
    info!("  GET    /total               - Cumulative total");
    info!("  *      /popup/...           - Hosted popup controller");
    info!("  GET    /status              - Timer and history status");
    info!("  GET    /health              - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
