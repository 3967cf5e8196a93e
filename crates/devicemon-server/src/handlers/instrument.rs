//! Request timing middleware.
//!
//! Observes every device-API request into the request summary, labelled by
//! the status code the response actually carries, the method, and the
//! matched route template. Unknown methods fold into `other` so label
//! values stay bounded.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

pub async fn track_requests(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = method_label(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let res = next.run(req).await;

    let status = res.status();
    let elapsed = start.elapsed();
    app.metrics().duration_summary.observe(
        &[("status", status.as_str()), ("method", method), ("path", path.as_str())],
        elapsed,
    );
    tracing::debug!(
        method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = elapsed.as_millis() as u64,
        "request"
    );

    res
}

fn method_label(m: &Method) -> &'static str {
    match *m {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "other",
    }
}
