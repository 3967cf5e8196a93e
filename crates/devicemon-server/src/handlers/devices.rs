//! Device API handlers.
//!
//! - `GET /devices`       : list (200, JSON)
//! - `POST /devices`      : create (201)
//! - `PUT /devices/:id`   : upgrade firmware (202)
//!
//! Bodies are decoded as JSON regardless of `Content-Type`. `HEAD /devices`
//! is a 405 like any other unlisted method.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use devicemon_core::error::DeviceMonError;
use devicemon_core::Device;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::latency::DelayOp;

pub const DEVICES_PATH: &str = "/devices";
pub const DEVICE_PATH: &str = "/devices/:id";

pub async fn list_devices(State(app): State<AppState>) -> Result<Response, ApiError> {
    let start = Instant::now();

    let devices = app.store().list().await;
    let body = serde_json::to_vec(&devices)
        .map_err(|e| DeviceMonError::Internal(e.to_string()))?;

    app.latency().inject(DelayOp::ListDevices).await;

    app.metrics().duration.observe(
        &[("status", "200"), ("method", "GET"), ("path", DEVICES_PATH)],
        start.elapsed(),
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

pub async fn create_device(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let device = Device::from_body(&body)?;
    let id = device.id;

    let metrics = app.metrics();
    let n = app
        .store()
        .append_with(device, |n| metrics.set_device_count(n))
        .await;
    tracing::debug!(id, devices = n, "device created");

    Ok((StatusCode::CREATED, "Device created."))
}

pub async fn upgrade_device(
    State(app): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_device_id(&raw_id)?;
    let update = Device::from_body(&body)?;

    let touched = app
        .store()
        .update_firmware(id, &update.firmware_version)
        .await;

    app.latency().inject(DelayOp::UpgradeDevice).await;

    // every device in this demo is a router
    app.metrics().upgrades.inc(&[("type", "router")]);
    tracing::debug!(id, touched, firmware = %update.firmware_version, "device upgraded");

    Ok((StatusCode::ACCEPTED, "Device upgraded."))
}

/// Positive integer IDs only; anything else is a 404.
fn parse_device_id(raw: &str) -> Result<i64, DeviceMonError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(DeviceMonError::NotFound),
    }
}

pub async fn devices_method_not_allowed() -> ApiError {
    ApiError(DeviceMonError::MethodNotAllowed { allow: "GET, POST" })
}

pub async fn device_method_not_allowed() -> ApiError {
    ApiError(DeviceMonError::MethodNotAllowed { allow: "PUT" })
}
