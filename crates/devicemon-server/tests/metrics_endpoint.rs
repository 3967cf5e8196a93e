#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::http::{header, StatusCode};

use devicemon_core::Device;
use devicemon_server::app_state::AppState;
use devicemon_server::config::{self, AppConfig};
use devicemon_server::latency::NoLatency;
use devicemon_server::router::{build_api_router, build_metrics_router};

use common::{body_string, call, send, state};

#[tokio::test]
async fn seed_list_create_upgrade_scrape() {
    let st = state();
    let api = build_api_router(st.clone());
    let metrics = build_metrics_router(st.clone());

    let (status, body) = call(&api, "GET", "/devices", "").await;
    assert_eq!(status, StatusCode::OK);
    let devices: Vec<Device> = serde_json::from_str(&body).unwrap();
    assert_eq!(devices.len(), 2);

    let (status, _) = call(
        &api,
        "POST",
        "/devices",
        r#"{"id":3,"mac":"AA:BB:CC:DD:EE:03","firmware":"2.0.0"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(&api, "PUT", "/devices/1", r#"{"firmware":"2.0.0"}"#).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(st.store().list().await[0].firmware_version, "2.0.0");

    let (status, _) = call(&api, "PUT", "/devices/abc", r#"{"firmware":"2.0.0"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = send(&metrics, "GET", "/metrics", "").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let text = body_string(res).await;

    assert!(text.lines().any(|l| l == "prometheus_app_device_count 3"), "{text}");
    assert!(text.contains("prometheus_app_version_info{version=\"1.0.0\"} 1\n"));
    assert!(text.contains("prometheus_app_device_upgrades_total{type=\"router\"} 1\n"));
    assert!(text.contains("# TYPE prometheus_app_request_duration_seconds histogram\n"));
    assert!(text.contains(
        "prometheus_app_request_duration_seconds_bucket{method=\"GET\",path=\"/devices\",status=\"200\",le=\"+Inf\"} 1\n"
    ));
    assert!(text.contains("# TYPE prometheus_app_request_duration_seconds_summary summary\n"));
    assert!(text.contains(
        "prometheus_app_request_duration_seconds_summary_count{method=\"PUT\",path=\"/devices/:id\",status=\"404\"} 1\n"
    ));
    assert!(text.contains("quantile=\"0.99\""));
    assert!(text.contains("process_start_time_seconds "));
    assert!(text.contains("tokio_workers "));
}

#[tokio::test]
async fn namespace_and_version_come_from_config() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  namespace: lab\napp:\n  version: \"2.5.0\"\n").unwrap();
    let st = AppState::with_latency(&cfg, Box::new(NoLatency)).unwrap();
    let text = st.registry().gather();

    assert!(text.contains("lab_device_count 2\n"));
    assert!(text.contains("lab_version_info{version=\"2.5.0\"} 1\n"));
    assert!(!text.contains("prometheus_app_"));
}

#[tokio::test]
async fn metrics_route_rejects_other_methods() {
    let metrics = build_metrics_router(state());
    let res = send(&metrics, "POST", "/metrics", "").await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn configured_random_latency_still_serves() {
    let mut cfg = AppConfig::default();
    cfg.delay.list_max_ms = 5;
    cfg.delay.upgrade_max_ms = 5;
    let api = build_api_router(AppState::new(&cfg).unwrap());

    let (status, _) = call(&api, "GET", "/devices", "").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&api, "PUT", "/devices/2", r#"{"firmware":"1.1.0"}"#).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}
