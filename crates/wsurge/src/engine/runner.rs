use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use wsurge_common::RunConfig;

use super::session::Session;
use super::{ramp, stats};

/// Final totals for a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub elapsed: Duration,
    pub spawned: usize,
    pub successful: u64,
    pub failed: u64,
    pub bytes_read: u64,
}

/// Drives a full run to completion: arms the optional duration timer, starts
/// the stats reporter, ramps workers up, then blocks until the shutdown
/// signal fires and every spawned worker has terminated.
pub async fn run(cfg: Arc<RunConfig>, session: Session) -> RunReport {
    let start = Instant::now();

    if let Some(duration) = cfg.duration() {
        session.shutdown.arm_deadline(duration);
    }

    let reporter = tokio::spawn(stats::report(
        session.clone(),
        cfg.timing.stats_interval(),
    ));

    let handles = ramp::ramp_up(&session, &cfg).await;
    let spawned = handles.len();

    if !session.shutdown.is_fired() {
        info!(spawned, "reached target connection count, waiting for stop condition");
    }
    session.shutdown.fired().await;

    info!("waiting for active connections to close");
    for handle in handles {
        if let Err(e) = handle.await {
            // a faulting worker abandons only its own connection slot
            error!(error = %e, "worker terminated abnormally");
        }
    }
    if let Err(e) = reporter.await {
        error!(error = %e, "stats reporter terminated abnormally");
    }

    let totals = session.counters.snapshot();
    RunReport {
        elapsed: start.elapsed(),
        spawned,
        successful: totals.successful,
        failed: totals.failed,
        bytes_read: totals.bytes_read,
    }
}
