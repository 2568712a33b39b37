use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;
use wsurge_common::RunConfig;

use super::session::Session;
use super::worker;

/// Spawns one connection worker per `1/rate` tick until the target count is
/// reached or the shutdown signal fires, whichever happens first.
///
/// Spawning is fire-and-forget: the controller never waits on a worker, and
/// dial failures stay inside the worker's own retry loop. Returns the handles
/// of every worker spawned so the coordinator can await full termination.
pub async fn ramp_up(session: &Session, cfg: &Arc<RunConfig>) -> Vec<JoinHandle<()>> {
    let period = Duration::from_secs_f64(1.0 / f64::from(cfg.rate));
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the interval yields its first tick immediately; the first worker
    // should land one full period after the ramp starts
    ticker.tick().await;

    let mut handles = Vec::with_capacity(cfg.connections);
    while handles.len() < cfg.connections {
        tokio::select! {
            _ = ticker.tick() => {
                let session = session.clone();
                let cfg = Arc::clone(cfg);
                handles.push(tokio::spawn(worker::run_worker(session, cfg)));
            }
            _ = session.shutdown.fired() => {
                info!(spawned = handles.len(), "stopping ramp-up, shutdown signal received");
                break;
            }
        }
    }
    handles
}
