//! HTTP server for the dive catalog.

use std::process::ExitCode;
use std::sync::Arc;

use dive_catalog::resource::{self, hash_password, AppState, ResourceRouter};
use dive_catalog::store::{seed, AdminCredential, SqliteStore};
use dive_catalog::{LogNotifier, ServerConfig};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => {
            info!("Server shut down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;

    info!(database = %config.database, "Opening store");
    let store = SqliteStore::open(&config.database)?;
    if config.seed_on_start {
        let admin = AdminCredential {
            username: config.admin_user.clone(),
            password_hash: hash_password(&config.admin_password)?,
        };
        store.populate(&seed::catalog_seed()?, &admin)?;
    }

    let resources = Arc::new(ResourceRouter::new(Arc::new(store)));
    let state = AppState::new(resources, Arc::new(LogNotifier));

    let listener = TcpListener::bind(config.bind_address()).await?;
    resource::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
