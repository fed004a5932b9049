//! Trait definitions for the monitor's external collaborators

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{AlertCategory, CandleSeries, HistoryPoint, PositionRecord};

/// Source of OHLCV bars (exchange REST API, fixtures, ...)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to `limit` most recent bars for `symbol` on `interval`
    ///
    /// # Arguments
    /// * `symbol` - Pair as configured, e.g. `SOL/USDT`
    /// * `interval` - Exchange interval code, e.g. `1m`, `5m`, `1h`
    /// * `limit` - Maximum number of bars to return
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u32)
        -> Result<CandleSeries>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}

/// Durable record of the current position
///
/// Implementations must make `save_position` atomic: a reader never sees
/// the state of one write combined with the entry price of another.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the current record, IDLE when nothing was stored yet
    async fn load_position(&self) -> Result<PositionRecord>;

    /// Upsert the current record
    async fn save_position(&self, record: &PositionRecord) -> Result<()>;

    /// Append one per-cycle history sample
    async fn record_history(&self, point: &HistoryPoint) -> Result<()>;
}

/// Notification sink for transitions and informational messages
///
/// Delivery is best-effort; implementations log their own failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, message: &str, category: AlertCategory);
}

/// Free balance lookup used for percentage-of-balance sizing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn free_balance(&self, asset: &str) -> Result<Decimal>;
}
