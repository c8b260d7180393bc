mod loop_runner;
mod metrics;
mod simulation;

pub use loop_runner::{run_simulation, LoopConfig, LoopReport};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use simulation::{Clock, ManualClock, Simulation, SystemClock};
