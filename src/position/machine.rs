use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::errors::{MonitorError, Result};
use crate::common::types::{AlertCategory, PositionRecord, PositionState};
use crate::config::types::RiskConfig;
use crate::strategy::{SignalRules, TimeframeFrames};

/// A state change computed for one cycle, not yet committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PositionState,
    pub to: PositionState,
    /// Reference price at the time of the decision
    pub price: f64,
    pub rationale: String,
    pub category: AlertCategory,
}

impl Transition {
    pub fn is_entry(&self) -> bool {
        self.from == PositionState::Idle && self.to.is_open()
    }

    /// Record to persist once this transition is applied
    pub fn record(&self) -> PositionRecord {
        if self.to.is_open() {
            PositionRecord::open(self.to, self.price)
        } else {
            PositionRecord::idle()
        }
    }

    /// Human-readable alert body
    pub fn message(&self, symbol: &str) -> String {
        if self.is_entry() {
            format!("<b>{}</b> {}", symbol, self.rationale)
        } else {
            format!(
                "<b>{}</b> EXIT {} @ {:.4} | {}",
                symbol, self.from, self.price, self.rationale
            )
        }
    }
}

/// Only IDLE→open and open→IDLE are legal
pub fn is_legal(from: PositionState, to: PositionState) -> bool {
    matches!(
        (from, to),
        (PositionState::Idle, PositionState::Long)
            | (PositionState::Idle, PositionState::Short)
            | (PositionState::Long, PositionState::Idle)
            | (PositionState::Short, PositionState::Idle)
    )
}

/// Unrealized move in percent, positive when the position is in profit
pub fn unrealized_pct(state: PositionState, entry_price: f64, price: f64) -> Option<f64> {
    if !entry_price.is_finite() || entry_price <= 0.0 || !price.is_finite() {
        return None;
    }
    let change = (price - entry_price) / entry_price * 100.0;
    match state {
        PositionState::Long => Some(change),
        PositionState::Short => Some(-change),
        PositionState::Idle => None,
    }
}

/// Tracks the single open position
///
/// `evaluate` never mutates; the caller persists `Transition::record` and
/// only then calls `commit`.
#[derive(Debug, Clone, Default)]
pub struct PositionStateMachine {
    record: PositionRecord,
}

impl PositionStateMachine {
    pub fn new(record: PositionRecord) -> Self {
        Self { record }
    }

    pub fn state(&self) -> PositionState {
        self.record.state
    }

    pub fn record(&self) -> &PositionRecord {
        &self.record
    }

    /// At most one transition for this cycle
    pub fn evaluate(
        &self,
        frames: &TimeframeFrames,
        rules: &dyn SignalRules,
        risk: &RiskConfig,
    ) -> Option<Transition> {
        let price = frames.price()?;
        let from = self.record.state;

        match from {
            PositionState::Idle => {
                let long = rules.check_long_entry(frames);
                if long.is_triggered {
                    return Some(self.transition(
                        PositionState::Long,
                        price,
                        long.rationale,
                        AlertCategory::EntryLong,
                    ));
                }
                let short = rules.check_short_entry(frames);
                if short.is_triggered {
                    return Some(self.transition(
                        PositionState::Short,
                        price,
                        short.rationale,
                        AlertCategory::EntryShort,
                    ));
                }
                debug!(long = %long.rationale, short = %short.rationale, "No entry");
                None
            }
            PositionState::Long | PositionState::Short => {
                let exit = if from == PositionState::Long {
                    rules.check_long_exit(frames)
                } else {
                    rules.check_short_exit(frames)
                };
                let rationale = if exit.is_triggered {
                    exit.rationale
                } else {
                    self.risk_exit(price, risk)?
                };
                Some(self.transition(PositionState::Idle, price, rationale, AlertCategory::Exit))
            }
        }
    }

    /// Apply a transition computed by `evaluate`
    pub fn commit(&mut self, transition: &Transition) -> Result<()> {
        if transition.from != self.record.state || !is_legal(transition.from, transition.to) {
            return Err(MonitorError::IllegalTransition {
                from: self.record.state.to_string(),
                to: transition.to.to_string(),
            });
        }
        self.record = transition.record();
        Ok(())
    }

    fn risk_exit(&self, price: f64, risk: &RiskConfig) -> Option<String> {
        let entry = self.record.entry_price?;
        let pct = unrealized_pct(self.record.state, entry, price)?;
        if pct <= -risk.stop_loss_pct {
            Some(format!("stop loss hit: {:.2}% from entry {:.4}", pct, entry))
        } else if pct >= risk.take_profit_pct {
            Some(format!("take profit hit: {:.2}% from entry {:.4}", pct, entry))
        } else {
            None
        }
    }

    fn transition(
        &self,
        to: PositionState,
        price: f64,
        rationale: String,
        category: AlertCategory,
    ) -> Transition {
        Transition {
            from: self.record.state,
            to,
            price,
            rationale,
            category,
        }
    }
}
