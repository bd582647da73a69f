//! Simulation driver and reporting.
//!
//! This module handles:
//! - Sequencing prices, scanning and execution per iteration
//! - Structured run records and the reporters that render them

pub mod driver;
pub mod report;

pub use driver::Simulation;
pub use report::{
    ConsoleReporter, IterationOutcome, JsonReporter, LogReporter, MemoryReporter, Reporter,
    RunStart, RunSummary,
};
