//! Monitor loop wiring source, engine, rules, store and sinks together

pub mod runner;
pub mod status;

pub use runner::{CycleOutcome, Monitor, SkipReason};
pub use status::{RsiZone, StatusSnapshot, TimeframeReading};
