//! Shared helpers for router-level tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use devicemon_server::app_state::AppState;
use devicemon_server::config::AppConfig;
use devicemon_server::latency::NoLatency;

/// Default config, no artificial latency.
pub fn state() -> AppState {
    AppState::with_latency(&AppConfig::default(), Box::new(NoLatency)).expect("state")
}

pub async fn send(app: &Router, method: &str, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_string(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn call(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
    let res = send(app, method, uri, body).await;
    let status = res.status();
    (status, body_string(res).await)
}
