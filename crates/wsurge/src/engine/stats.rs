use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::session::Session;

/// Emits one status line per interval from a point-in-time counter snapshot,
/// until the shutdown signal fires. Never decides when the run ends.
pub async fn report(session: Session, interval: Duration) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let s = session.counters.snapshot();
                info!(
                    active = s.active,
                    succeeded = s.successful,
                    failed = s.failed,
                    bytes_read = s.bytes_read,
                    "status",
                );
            }
            _ = session.shutdown.fired() => return,
        }
    }
}
