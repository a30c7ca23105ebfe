//! Orchestrator - prober fan-out and result collection
//!
//! A run spawns one prober task per (domain, port, protocol) triple. Tasks
//! report over two bounded channels, one for probe results and one for
//! unresolved domains. An outstanding-task counter tracks the tasks; when it
//! reaches zero both channels close and the collector drains what is left.

mod channels;
mod collector;
mod completion;
mod dispatcher;
mod orchestrator;
mod output;
mod progress;
mod tracker;

#[cfg(test)]
mod testing;

pub use channels::{result_channels, ResultReceivers, ResultSenders};
pub use collector::{Collector, Sinks};
pub use completion::CompletionSignal;
pub use dispatcher::Dispatcher;
pub use orchestrator::Orchestrator;
pub use output::OutputFormat;
pub use progress::{ProgressTracker, RunSummary};
pub use tracker::{TaskGuard, TaskTracker};
