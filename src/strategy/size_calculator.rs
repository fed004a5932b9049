use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::common::errors::{MonitorError, Result};
use crate::config::types::RiskConfig;

/// Computed quantity for a potential entry
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSize {
    /// Quote-asset amount put at risk
    pub notional: Decimal,
    /// Base-asset quantity at the reference price
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Sizes entries as a fixed fraction of the free quote balance
#[derive(Debug, Clone)]
pub struct PositionSizer {
    risk_per_trade: Decimal,
}

impl PositionSizer {
    pub fn new(risk: &RiskConfig) -> Result<Self> {
        let risk_per_trade = Decimal::from_f64(risk.risk_per_trade).ok_or_else(|| {
            MonitorError::Configuration(format!(
                "risk_per_trade {} is not representable",
                risk.risk_per_trade
            ))
        })?;
        Ok(Self { risk_per_trade })
    }

    pub fn risk_per_trade(&self) -> Decimal {
        self.risk_per_trade
    }

    /// quantity = balance * risk_per_trade / price
    ///
    /// Returns `None` when the price is not positive or the result rounds
    /// to nothing.
    pub fn size(&self, balance: Decimal, price: f64) -> Option<ComputedSize> {
        let price = Decimal::from_f64(price).filter(|p| *p > Decimal::ZERO)?;
        let notional = balance * self.risk_per_trade;
        let quantity = (notional / price).round_dp(8);
        if quantity <= Decimal::ZERO {
            return None;
        }
        Some(ComputedSize {
            notional,
            quantity,
            price,
        })
    }
}
