#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use devicemon_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  api_listen: "0.0.0.0:8080"
delay:
  list_max: 100 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.status_code(), 400);
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.api_listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.metrics_listen, "0.0.0.0:8081");
    assert_eq!(cfg.metrics.namespace, "prometheus_app");
    assert_eq!(cfg.app.version, "1.0.0");
    assert!(cfg.delay.enabled);
    assert_eq!(cfg.delay.list_max_ms, 200);
    assert_eq!(cfg.delay.upgrade_max_ms, 1000);
}

#[test]
fn full_config_overrides_defaults() {
    let ok = r#"
version: 1
server:
  api_listen: "127.0.0.1:9000"
  metrics_listen: "127.0.0.1:9001"
metrics:
  namespace: "lab"
app:
  version: "2.1.0"
delay:
  enabled: false
  list_max_ms: 0
  upgrade_max_ms: 50
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.api_addr().unwrap().port(), 9000);
    assert_eq!(cfg.server.metrics_addr().unwrap().port(), 9001);
    assert_eq!(cfg.metrics.namespace, "lab");
    assert_eq!(cfg.app.version, "2.1.0");
    assert!(!cfg.delay.enabled);
    assert_eq!(cfg.delay.upgrade_max_ms, 50);
}

#[test]
fn unsupported_version_is_rejected() {
    assert!(config::load_from_str("version: 2\n").is_err());
}

#[test]
fn listeners_must_differ() {
    let bad = r#"
version: 1
server:
  api_listen: "0.0.0.0:8080"
  metrics_listen: "0.0.0.0:8080"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn listen_must_be_socket_addr() {
    let bad = r#"
version: 1
server:
  api_listen: "localhost"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn namespace_must_be_metric_safe() {
    for ns in ["", "9app", "my-app"] {
        let s = format!("version: 1\nmetrics:\n  namespace: \"{ns}\"\n");
        assert!(config::load_from_str(&s).is_err(), "namespace {ns:?} accepted");
    }
}

#[test]
fn delay_bound_is_capped() {
    let bad = "version: 1\ndelay:\n  upgrade_max_ms: 600000\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn missing_file_yields_defaults() {
    let cfg = config::load_or_default("definitely/not/here/devicemon.yaml").expect("defaults");
    assert_eq!(cfg.app.version, "1.0.0");
    assert!(config::load_from_file("definitely/not/here/devicemon.yaml").is_err());
}
