//! DICRI evidence API server
//!
//! Reads configuration from `$DICRI_CONFIG` or
//! `~/.config/dicri-evidence/config.toml`, then environment overrides.

use tracing::{error, info};

use dicri_evidence::server::{init_tracing, ServerHandle, ServerOptions};
use dicri_evidence::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration ({}): {}", config_path.display(), e);
            return Err(e.into());
        }
    };
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions { config }).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return Err(e.into());
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
