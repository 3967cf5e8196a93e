//! Axum router wiring.
//!
//! Two routers, one per listener: the device API (wrapped in the timing
//! middleware) and the metrics scrape endpoint.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::app_state::AppState;
use crate::handlers::devices::{self, DEVICES_PATH, DEVICE_PATH};
use crate::handlers::instrument::track_requests;
use crate::ops;

pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route(
            DEVICES_PATH,
            get(devices::list_devices)
                .post(devices::create_device)
                .head(devices::devices_method_not_allowed)
                .fallback(devices::devices_method_not_allowed),
        )
        .route(
            DEVICE_PATH,
            put(devices::upgrade_device).fallback(devices::device_method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

pub fn build_metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
