//! Listener lifecycle.
//!
//! The device API and the metrics endpoint run on separate listeners. Both
//! are bound before either starts serving; when either server ends, the
//! other is dropped and the error is returned to the caller.

use std::future::IntoFuture;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use devicemon_core::error::{DeviceMonError, Result};

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::router::{build_api_router, build_metrics_router};

pub async fn run(cfg: &AppConfig) -> Result<()> {
    let api_addr = cfg.server.api_addr()?;
    let metrics_addr = cfg.server.metrics_addr()?;

    let state = AppState::new(cfg)?;

    let api = bind("api", api_addr).await?;
    let metrics = bind("metrics", metrics_addr).await?;

    serve(api, metrics, state).await
}

async fn bind(name: &str, addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| DeviceMonError::Internal(format!("{name} listener bind {addr} failed: {e}")))
}

/// Serve both routers on already-bound listeners until one of them fails.
pub async fn serve(api: TcpListener, metrics: TcpListener, state: AppState) -> Result<()> {
    let api_addr = api.local_addr().ok();
    let metrics_addr = metrics.local_addr().ok();
    tracing::info!(?api_addr, ?metrics_addr, "devicemon-server listening");

    let api_srv = axum::serve(api, build_api_router(state.clone())).into_future();
    let metrics_srv = axum::serve(metrics, build_metrics_router(state)).into_future();

    let (name, res) = tokio::select! {
        r = api_srv => ("api", r),
        r = metrics_srv => ("metrics", r),
    };

    match res {
        Ok(()) => {
            tracing::warn!(listener = name, "listener stopped");
            Ok(())
        }
        Err(e) => Err(DeviceMonError::Internal(format!("{name} listener failed: {e}"))),
    }
}
