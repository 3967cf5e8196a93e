//! devicemon-server
//!
//! - Device API: GET/POST /devices, PUT /devices/:id
//! - Metrics: GET /metrics on a second listener
//!
//! Usage: `devicemon-server [config.yaml]` (defaults apply when the file is
//! absent).

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use devicemon_server::{config, server};

const DEFAULT_CONFIG_PATH: &str = "devicemon.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let cfg = match config::load_or_default(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(version = %cfg.app.version, "devicemon-server starting");
    if let Err(e) = server::run(&cfg).await {
        tracing::error!(error = %e, "devicemon-server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
