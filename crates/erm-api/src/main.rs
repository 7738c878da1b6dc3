//! ERM API server binary

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use erm_api::{bootstrap::bootstrap, scheduler::spawn_overdue_sweep, ApiServer, AppState};
use erm_config::{ConfigManager, ConfigManagerTrait, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut manager = ConfigManager::new();
    let config = manager
        .load_config()
        .context("failed to load configuration")?;

    init_tracing(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting ERM API");

    if config.auth.uses_development_secret() {
        warn!("Using the development JWT secret; set ERM__AUTH__JWT_SECRET in production");
    }

    let state = AppState::in_memory(&config);
    bootstrap(&state, &config.bootstrap)
        .await
        .context("failed to seed reference data")?;

    let sweep = match config.scheduler.overdue_sweep_interval_secs {
        0 => None,
        secs => Some(spawn_overdue_sweep(
            state.mitigations.clone(),
            Duration::from_secs(secs),
        )),
    };

    let server = ApiServer::new(state, config.server.bind_address());
    server
        .serve(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(sweep) = sweep {
        sweep.abort();
    }
    info!("ERM API stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
