//! Workforce engine HTTP server.
//!
//! Reads the YAML configuration named by `WORKFORCE_CONFIG` (default
//! `config.yaml`; a missing file means defaults), seeds the in-memory store
//! and serves the API.

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use workforce_engine::api::{AppState, create_router};
use workforce_engine::config::{ConfigLoader, LoggingConfig};

const CONFIG_ENV: &str = "WORKFORCE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::load_or_default(&path)?.into_config();
    init_logging(&config.logging);

    info!(
        config = %path,
        max_shift_hours = config.attendance.max_shift_hours,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    info!(addr = %config.server.listen_addr, "Workforce engine listening");
    axum::serve(listener, app).await?;
    Ok(())
}
