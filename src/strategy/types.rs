use serde::{Deserialize, Serialize};

use crate::common::types::TimeframeRole;
use crate::indicators::IndicatorFrame;

/// Outcome of one rule check
///
/// Produced fresh every cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub is_triggered: bool,
    /// Why the check fired, or which filter rejected it
    pub rationale: String,
}

impl SignalDecision {
    /// A check that fired
    pub fn triggered(rationale: impl Into<String>) -> Self {
        Self {
            is_triggered: true,
            rationale: rationale.into(),
        }
    }

    /// A check that did not fire
    pub fn rejected(rationale: impl Into<String>) -> Self {
        Self {
            is_triggered: false,
            rationale: rationale.into(),
        }
    }
}

/// The three enriched frames one evaluation needs, all from the same cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeframeFrames {
    /// Entry timing
    pub fast: IndicatorFrame,
    /// Confirmation and exits
    pub medium: IndicatorFrame,
    /// Macro trend
    pub slow: IndicatorFrame,
}

impl TimeframeFrames {
    pub fn new(fast: IndicatorFrame, medium: IndicatorFrame, slow: IndicatorFrame) -> Self {
        Self { fast, medium, slow }
    }

    pub fn get(&self, role: TimeframeRole) -> &IndicatorFrame {
        match role {
            TimeframeRole::Fast => &self.fast,
            TimeframeRole::Medium => &self.medium,
            TimeframeRole::Slow => &self.slow,
        }
    }

    /// Latest fast close, the reference price for entries and risk checks
    pub fn price(&self) -> Option<f64> {
        self.fast.last().map(|r| r.close)
    }
}
