use crate::engine::counters::Counters;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_CONNECTIONS: IntGauge = IntGauge::new(
        "wsurge_active_connections",
        "Number of currently open WebSocket connections"
    )
    .expect("metric can be created");
    pub static ref SUCCESSFUL_CONNECTIONS: IntCounter = IntCounter::new(
        "wsurge_successful_connections_total",
        "Total successful connection attempts, reconnects included"
    )
    .expect("metric can be created");
    pub static ref FAILED_CONNECTIONS: IntCounter = IntCounter::new(
        "wsurge_failed_connections_total",
        "Total failed connection and heartbeat attempts"
    )
    .expect("metric can be created");
    pub static ref BYTES_READ: IntCounter = IntCounter::new(
        "wsurge_bytes_read_total",
        "Total payload bytes read across all connections"
    )
    .expect("metric can be created");
}

pub fn register_metrics() {
    let _ = REGISTRY.register(Box::new(ACTIVE_CONNECTIONS.clone()));
    let _ = REGISTRY.register(Box::new(SUCCESSFUL_CONNECTIONS.clone()));
    let _ = REGISTRY.register(Box::new(FAILED_CONNECTIONS.clone()));
    let _ = REGISTRY.register(Box::new(BYTES_READ.clone()));
}

/// Syncs the prometheus view with the engine counters. Counters only move
/// forward, so each is advanced by the delta observed since the last render.
fn update_metrics(counters: &Counters) {
    let s = counters.snapshot();
    ACTIVE_CONNECTIONS.set(s.active);
    SUCCESSFUL_CONNECTIONS.inc_by(s.successful.saturating_sub(SUCCESSFUL_CONNECTIONS.get()));
    FAILED_CONNECTIONS.inc_by(s.failed.saturating_sub(FAILED_CONNECTIONS.get()));
    BYTES_READ.inc_by(s.bytes_read.saturating_sub(BYTES_READ.get()));
}

pub fn render_metrics(counters: &Counters) -> String {
    update_metrics(counters);

    let metric_families = REGISTRY.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| "# Error: Invalid UTF8".to_string())
}
