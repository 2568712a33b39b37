use serde::Deserialize;
use std::time::Duration;

/// A fully resolved run configuration: immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target endpoint, `ws://` or `wss://`.
    pub url: String,
    /// Total concurrent connections to establish.
    pub connections: usize,
    /// New connections per second during ramp-up.
    pub rate: u32,
    /// Run duration in seconds; 0 runs until interrupted.
    pub duration_secs: u64,
    /// Emit per-connection diagnostics.
    pub verbose: bool,
    pub timing: TimingConfig,
}

impl RunConfig {
    /// Rejects configurations that cannot produce a meaningful run.
    /// URL scheme validation happens at dial setup, where the URI parser lives.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("target URL (--url) is required".to_string());
        }
        if self.connections == 0 {
            return Err("connections (-c) must be positive".to_string());
        }
        if self.rate == 0 {
            return Err("rate (-r) must be positive".to_string());
        }
        Ok(())
    }

    pub fn duration(&self) -> Option<Duration> {
        (self.duration_secs > 0).then(|| Duration::from_secs(self.duration_secs))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connections: 100,
            rate: 10,
            duration_secs: 0,
            verbose: false,
            timing: TimingConfig::default(),
        }
    }
}

/// Fixed timing parameters of the connection lifecycle. Not exposed as CLI
/// flags; overridable via the config file (and shrunk by the test suite).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between reconnect attempts after any dropped connection.
    pub reconnect_delay_ms: u64,
    /// Read inactivity window before a heartbeat probe is sent.
    pub read_deadline_ms: u64,
    /// Wait after sending a close frame, letting the peer acknowledge.
    pub shutdown_grace_ms: u64,
    /// Cadence of the periodic status line.
    pub stats_interval_ms: u64,
    /// Upper bound on a single dial (TCP connect + handshake) attempt.
    pub dial_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2_000,
            read_deadline_ms: 10_000,
            shutdown_grace_ms: 500,
            stats_interval_ms: 5_000,
            dial_timeout_ms: 45_000,
        }
    }
}

impl TimingConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn read_deadline(&self) -> Duration {
        Duration::from_millis(self.read_deadline_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9091,
        }
    }
}

/// Optional YAML config file. Every scalar is optional so command-line flags
/// can override individual fields; sections fall back to their defaults.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct FileConfig {
    pub url: Option<String>,
    pub connections: Option<usize>,
    pub rate: Option<u32>,
    pub duration_secs: Option<u64>,
    pub verbose: Option<bool>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl FileConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}

/// Command-line values layered over a [`FileConfig`]. A `None` lets the file
/// value (and then the built-in default) stand.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub connections: Option<usize>,
    pub rate: Option<u32>,
    pub duration_secs: Option<u64>,
    pub verbose: bool,
    pub metrics_port: Option<u16>,
}

/// Resolves the effective configuration: flag over file over default.
pub fn resolve(overrides: Overrides, file: FileConfig) -> (RunConfig, MetricsConfig) {
    let defaults = RunConfig::default();
    let run = RunConfig {
        url: overrides.url.or(file.url).unwrap_or(defaults.url),
        connections: overrides
            .connections
            .or(file.connections)
            .unwrap_or(defaults.connections),
        rate: overrides.rate.or(file.rate).unwrap_or(defaults.rate),
        duration_secs: overrides
            .duration_secs
            .or(file.duration_secs)
            .unwrap_or(defaults.duration_secs),
        verbose: overrides.verbose || file.verbose.unwrap_or(false),
        timing: file.timing,
    };

    let mut metrics = file.metrics;
    if let Some(port) = overrides.metrics_port {
        metrics.enabled = true;
        metrics.port = port;
    }

    (run, metrics)
}
