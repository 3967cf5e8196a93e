//! HTTP mapping for `DeviceMonError`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use devicemon_core::error::DeviceMonError;

/// Handler error: plain-text body with the error message, plus `Allow`
/// on 405.
#[derive(Debug)]
pub struct ApiError(pub DeviceMonError);

impl From<DeviceMonError> for ApiError {
    fn from(e: DeviceMonError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let mut res = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self.0),
        )
            .into_response();
        if let Some(allow) = self.0.allow() {
            res.headers_mut().insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        res
    }
}
