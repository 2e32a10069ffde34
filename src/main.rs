//! Stopwatch - a stopwatch daemon with a time limit alert
//!
//! This is the main entry point for the stopwatch application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use stopwatch::{
    config::Config,
    state::AppState,
    api::create_router,
    services::check_notify_command_available,
    tasks::{alert_dispatch_task, tick_driver_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("stopwatch={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stopwatch server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, limit={:?}",
          config.host, config.port, config.tick_ms, config.limit);

    // Create application state; this registers the alert channel
    let (state, fired_rx) = AppState::new(
        config.port,
        config.host.clone(),
        config.tick_interval(),
        config.limit.as_deref(),
    );
    let state = Arc::new(state);

    // Start the tick driver
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(tick_state, fired_rx).await;
    });

    // Forward alerts to the desktop unless disabled or unavailable
    if config.no_desktop {
        info!("Desktop alerts disabled");
    } else {
        match check_notify_command_available(&config.notify_command).await {
            Ok(()) => {
                let events_rx = state.alert_tx.subscribe();
                let notify_command = config.notify_command.clone();
                tokio::spawn(async move {
                    alert_dispatch_task(events_rx, notify_command).await;
                });
            }
            Err(e) => warn!("{}", e),
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start         - Start the stopwatch");
    info!("  POST /reset         - Stop and zero the stopwatch");
    info!("  POST /limit         - Set the time limit (stopped only)");
    info!("  POST /alert/dismiss - Dismiss the overtime alert");
    info!("  GET  /status        - Current display and alert state");
    info!("  GET  /health        - Health check");

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

    if let Err(e) = state.dispose() {
        warn!("Failed to dispose stopwatch: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
