use clap::Parser;
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wsurge::engine::worker::validate_url;
use wsurge::{metrics, Counters, Session};
use wsurge_common::{FileConfig, Overrides};

/// WebSocket load generator: ramps up concurrent connections at a fixed
/// rate, holds them open with reconnect-on-failure, and reports aggregate
/// liveness and throughput statistics.
#[derive(Parser, Debug)]
#[command(name = "wsurge", version)]
struct Cli {
    /// Target WebSocket URL (e.g. ws://localhost:8080/ws)
    #[arg(long)]
    url: Option<String>,

    /// Total concurrent connections to establish
    #[arg(short = 'c', long)]
    connections: Option<usize>,

    /// New connections per second during ramp-up
    #[arg(short = 'r', long)]
    rate: Option<u32>,

    /// Run duration in seconds; 0 runs until interrupted
    #[arg(short = 'd', long)]
    duration: Option<u64>,

    /// Verbose per-connection diagnostics
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Optional YAML config file; flags override file values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Structured JSON log output
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            connections: self.connections,
            rate: self.rate,
            duration_secs: self.duration,
            verbose: self.verbose,
            metrics_port: self.metrics_port,
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose { "info,wsurge=debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn metrics_handler(
    req: Request<Body>,
    counters: Arc<Counters>,
) -> Result<Response<Body>, Infallible> {
    match req.uri().path() {
        "/health" => Ok(Response::new(Body::from("OK"))),
        "/metrics" => Ok(Response::new(Body::from(metrics::render_metrics(&counters)))),
        _ => {
            let mut not_found = Response::new(Body::from("Not Found"));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            Ok(not_found)
        }
    }
}

async fn run_metrics_server(port: u16, counters: Arc<Counters>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics::register_metrics();

    let make_svc = make_service_fn(move |_conn| {
        let counters = Arc::clone(&counters);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                metrics_handler(req, Arc::clone(&counters))
            }))
        }
    });

    let server = Server::bind(&addr).serve(make_svc);

    info!(port, "observability server online");

    if let Err(e) = server.await {
        error!(error = %e, "observability server failed");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => FileConfig::from_yaml(&fs::read_to_string(path)?)?,
        None => FileConfig::default(),
    };
    let (cfg, metrics_cfg) = wsurge_common::resolve(cli.overrides(), file);

    init_logging(cfg.verbose, cli.log_json);

    cfg.validate()?;
    validate_url(&cfg.url)?;

    info!("starting WebSocket load run:");
    info!("  url: {}", cfg.url);
    info!("  connections: {}", cfg.connections);
    info!("  rate: {}/s", cfg.rate);
    match cfg.duration() {
        Some(d) => info!("  duration: {:?}", d),
        None => info!("  duration: unlimited (until interrupted)"),
    }

    let session = Session::new();

    if metrics_cfg.enabled {
        let counters = Arc::clone(&session.counters);
        let port = metrics_cfg.port;
        tokio::spawn(async move {
            run_metrics_server(port, counters).await;
        });
    }

    let shutdown = session.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping workers");
            shutdown.fire();
        }
    });

    let report = wsurge::run(Arc::new(cfg), session).await;

    info!("run finished");
    info!("  duration: {:.3?}", report.elapsed);
    info!("  successful connections: {}", report.successful);
    info!("  failed connections: {}", report.failed);
    info!("  total bytes read: {}", report.bytes_read);

    Ok(())
}
