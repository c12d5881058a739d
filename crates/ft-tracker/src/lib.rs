//! Fleet tracker: library crate for the per-vehicle tracking runtime.
//!
//! Re-exports all modules so external crates (e.g. `ft-e2e-tests`) can
//! drive sources, assembly and sinks directly.

pub mod assemble;
pub mod config;
pub mod mock;
pub mod sink;
pub mod source;
pub mod tracker;

pub use assemble::assemble;
pub use mock::{MemorySink, MockSensorSource};
pub use sink::{AlertSink, LogSink};
pub use source::{RawSample, ReplaySource, SensorSource, SourceError, SourceResult};
pub use tracker::{VehicleTracker, run_sweeper};
