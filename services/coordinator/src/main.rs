//! Relief Coordinator
//!
//! Serves the coordination API: camp inventory and priority, volunteer
//! matching, the task lifecycle and the alert push channel.

use anyhow::Result;
use relief_coordinator::{alerts::AlertBroadcaster, api, config, seed, state::AppState};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    // Prefer RUST_LOG, fall back to RELIEF_LOG_LEVEL.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting relief coordinator");
    info!(
        listen_addr = %config.listen_addr,
        policy = ?config.tasks.policy,
        reject_double_booking = config.tasks.reject_double_booking,
        alert_buffer = config.alert_buffer,
        "Configuration loaded"
    );

    let state = AppState::new(config.tasks, AlertBroadcaster::new(config.alert_buffer));

    if config.dev_mode {
        info!("Seeding demo data (dev mode)");
        if let Err(e) = seed::seed(&state).await {
            error!(error = %e, "Failed to seed demo data");
            return Err(e.into());
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = api::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut shutdown_rx = shutdown_rx;
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    // Open alert streams would otherwise hold graceful shutdown open.
    state.alerts().close();
    let _ = shutdown_tx.send(true);

    info!("Coordinator shutdown complete");
    Ok(())
}
