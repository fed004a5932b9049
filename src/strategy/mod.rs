//! Signal rules and position sizing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PER CYCLE (sync)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TimeframeFrames (fast / medium / slow)                     │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  SignalRules.check_*() → SignalDecision                     │
//! │       │                                                     │
//! │       ▼ (if triggered)                                      │
//! │  PositionStateMachine                                       │
//! │    - Validates and records the transition                   │
//! │    - PositionSizer turns the free balance into a quantity   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`SignalRules`]: Trait for entry and exit rule sets
//! - [`SignalDecision`]: Triggered flag plus rationale
//! - [`TrendChannelRules`]: EMA channel rules confirmed on three timeframes
//! - [`PositionSizer`]: Fixed-fraction quantity from the free balance

mod evaluator;
mod size_calculator;
mod traits;
mod types;

pub use evaluator::{
    check_long_entry, check_long_exit, check_short_entry, check_short_exit, is_downtrend,
    is_uptrend, TrendChannelRules,
};

pub use size_calculator::{ComputedSize, PositionSizer};

pub use traits::SignalRules;

pub use types::{SignalDecision, TimeframeFrames};
