pub mod counters;
pub mod ramp;
pub mod runner;
pub mod session;
pub mod shutdown;
pub mod stats;
pub mod worker;
