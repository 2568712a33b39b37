pub mod engine;
pub mod metrics;

pub use engine::counters::{Counters, CountersSnapshot};
pub use engine::runner::{run, RunReport};
pub use engine::session::Session;
pub use engine::shutdown::ShutdownSignal;
