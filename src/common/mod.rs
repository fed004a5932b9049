//! Common types, traits and utilities shared across the monitor

pub mod channels;
pub mod errors;
pub mod retry;
pub mod traits;
pub mod types;
