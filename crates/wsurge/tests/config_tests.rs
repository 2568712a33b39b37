use wsurge::engine::worker::validate_url;
use wsurge_common::{resolve, FileConfig, Overrides, RunConfig};

#[test]
fn defaults_apply_when_nothing_is_given() {
    let (cfg, metrics) = resolve(Overrides::default(), FileConfig::default());

    assert_eq!(cfg.url, "");
    assert_eq!(cfg.connections, 100);
    assert_eq!(cfg.rate, 10);
    assert_eq!(cfg.duration_secs, 0);
    assert!(!cfg.verbose);
    assert_eq!(cfg.timing.reconnect_delay_ms, 2_000);
    assert_eq!(cfg.timing.read_deadline_ms, 10_000);
    assert_eq!(cfg.timing.shutdown_grace_ms, 500);
    assert_eq!(cfg.timing.stats_interval_ms, 5_000);
    assert!(!metrics.enabled);
}

#[test]
fn flags_override_file_values() {
    let file = FileConfig {
        url: Some("ws://file.example/ws".to_string()),
        connections: Some(10),
        rate: Some(1),
        ..FileConfig::default()
    };
    let overrides = Overrides {
        url: Some("ws://flag.example/ws".to_string()),
        connections: Some(50),
        ..Overrides::default()
    };

    let (cfg, _) = resolve(overrides, file);
    assert_eq!(cfg.url, "ws://flag.example/ws");
    assert_eq!(cfg.connections, 50);
    assert_eq!(cfg.rate, 1, "file value stands where no flag was given");
}

#[test]
fn metrics_port_flag_enables_the_endpoint() {
    let overrides = Overrides {
        metrics_port: Some(9200),
        ..Overrides::default()
    };

    let (_, metrics) = resolve(overrides, FileConfig::default());
    assert!(metrics.enabled);
    assert_eq!(metrics.port, 9200);
}

#[test]
fn yaml_file_parses_with_timing_overrides() {
    let raw = r#"
url: ws://localhost:9001
connections: 25
timing:
  reconnect_delay_ms: 100
metrics:
  enabled: true
  port: 9100
"#;
    let file = FileConfig::from_yaml(raw).unwrap();
    let (cfg, metrics) = resolve(Overrides::default(), file);

    assert_eq!(cfg.url, "ws://localhost:9001");
    assert_eq!(cfg.connections, 25);
    assert_eq!(cfg.timing.reconnect_delay_ms, 100);
    assert_eq!(
        cfg.timing.read_deadline_ms, 10_000,
        "unset timing fields keep their defaults"
    );
    assert!(metrics.enabled);
    assert_eq!(metrics.port, 9100);
}

#[test]
fn validation_rejects_degenerate_configs() {
    let ok = RunConfig {
        url: "ws://localhost:9001".to_string(),
        ..RunConfig::default()
    };
    assert!(ok.validate().is_ok());

    let missing_url = RunConfig::default();
    assert!(missing_url.validate().is_err());

    let zero_connections = RunConfig {
        connections: 0,
        ..ok.clone()
    };
    assert!(zero_connections.validate().is_err());

    let zero_rate = RunConfig { rate: 0, ..ok };
    assert!(zero_rate.validate().is_err());
}

#[test]
fn url_validation_requires_a_websocket_scheme() {
    assert!(validate_url("ws://localhost:8080/ws").is_ok());
    assert!(validate_url("wss://example.com/feed").is_ok());

    assert!(validate_url("http://example.com").is_err());
    assert!(validate_url("not a url at all").is_err());
}

#[test]
fn duration_zero_means_unbounded() {
    let cfg = RunConfig::default();
    assert!(cfg.duration().is_none());

    let bounded = RunConfig {
        duration_secs: 30,
        ..RunConfig::default()
    };
    assert_eq!(bounded.duration().unwrap().as_secs(), 30);
}
