//! Replace the catalog with the default seed and ensure the admin login.

use std::process::ExitCode;

use dive_catalog::resource::hash_password;
use dive_catalog::store::{seed, AdminCredential, SqliteStore};
use dive_catalog::ServerConfig;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run() {
        Ok(inserted) => {
            info!(inserted, "Database populated successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error populating database: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<usize, Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    let store = SqliteStore::open(&config.database)?;
    let catalog = seed::catalog_seed()?;
    let admin = AdminCredential {
        username: config.admin_user.clone(),
        password_hash: hash_password(&config.admin_password)?,
    };
    Ok(store.populate(&catalog, &admin)?)
}
