use std::sync::Arc;

use super::counters::Counters;
use super::shutdown::ShutdownSignal;

/// Shared per-run state: the counters every worker updates and the shutdown
/// signal every task observes. Constructed once by the coordinator and passed
/// explicitly to the ramp controller, each worker, and the stats reporter.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub counters: Arc<Counters>,
    pub shutdown: ShutdownSignal,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
