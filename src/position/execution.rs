use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::errors::Result;
use crate::common::types::PositionState;
use crate::position::machine::Transition;

/// Trade side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// What an execution port is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionAction {
    /// Open a position on the given side
    Open(Side),
    /// Close whatever is open
    Close(Side),
}

/// An order derived from a committed transition
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionIntent {
    pub symbol: String,
    pub action: ExecutionAction,
    pub price: f64,
    /// Base-asset quantity; `None` when no balance was available for sizing
    pub quantity: Option<Decimal>,
    pub reason: String,
}

impl ExecutionIntent {
    pub fn from_transition(symbol: impl Into<String>, transition: &Transition) -> Self {
        let action = match (transition.from, transition.to) {
            (_, PositionState::Long) => ExecutionAction::Open(Side::Buy),
            (_, PositionState::Short) => ExecutionAction::Open(Side::Sell),
            (PositionState::Short, PositionState::Idle) => ExecutionAction::Close(Side::Buy),
            _ => ExecutionAction::Close(Side::Sell),
        };
        Self {
            symbol: symbol.into(),
            action,
            price: transition.price,
            quantity: None,
            reason: transition.rationale.clone(),
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn is_open(&self) -> bool {
        matches!(self.action, ExecutionAction::Open(_))
    }
}

/// Receives every committed transition
///
/// Failures are reported to the caller, which logs them and carries on;
/// the recorded position is never rolled back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionPort: Send + Sync {
    async fn execute(&self, intent: &ExecutionIntent) -> Result<()>;
}

/// Logs intents and places nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExecution;

#[async_trait]
impl ExecutionPort for NoopExecution {
    async fn execute(&self, intent: &ExecutionIntent) -> Result<()> {
        info!(
            symbol = %intent.symbol,
            action = ?intent.action,
            price = intent.price,
            quantity = ?intent.quantity,
            "Execution intent (no-op)"
        );
        Ok(())
    }
}
