//! StormForge REST API server.
//!
//! Reads configuration from `.env`, an optional TOML file
//! (`$STORMFORGE_CONFIG`, default `./stormforge.toml`) and environment variables.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stormforge::config::LoggingConfig;
use stormforge::{default_config_path, AppConfig, ServerHandle};

fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if cfg.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // ── Load configuration ─────────────────────────────────────
    let config_path = default_config_path();
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_logging(&cfg.logging);
            info!("Configuration loaded ({})", config_path.display());
            cfg
        }
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    if dotenv_loaded {
        info!("Environment loaded from .env");
    }

    let handle = ServerHandle::start(app_cfg).await.map_err(|e| {
        error!("Failed to start server: {}", e);
        e
    })?;

    handle.listen_for_os_signals();
    info!("Server started. Press Ctrl+C to shutdown gracefully.");
    handle.wait().await;

    Ok(())
}
