//! Unified types shared by the data source, engine, state machine and adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::{MonitorError, Result};

/// A single OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded base volume, never negative
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Candles for one (symbol, interval), strictly ascending by timestamp
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series, rejecting unordered, duplicated or non-finite bars
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        for (i, candle) in candles.iter().enumerate() {
            let values = [
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(MonitorError::InvalidSeries(format!(
                    "non-finite value in bar {} ({})",
                    i, candle.timestamp
                )));
            }
            if candle.volume < 0.0 {
                return Err(MonitorError::InvalidSeries(format!(
                    "negative volume {} in bar {}",
                    candle.volume, i
                )));
            }
            if i > 0 && candles[i - 1].timestamp >= candle.timestamp {
                return Err(MonitorError::InvalidSeries(format!(
                    "timestamps not strictly ascending at bar {} ({} >= {})",
                    i,
                    candles[i - 1].timestamp,
                    candle.timestamp
                )));
            }
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

/// Functional purpose of one of the three polled intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeframeRole {
    /// Entry timing
    Fast,
    /// Confirmation and exits
    Medium,
    /// Macro trend context
    Slow,
}

impl TimeframeRole {
    pub const ALL: [TimeframeRole; 3] = [
        TimeframeRole::Fast,
        TimeframeRole::Medium,
        TimeframeRole::Slow,
    ];
}

impl std::fmt::Display for TimeframeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeframeRole::Fast => write!(f, "fast"),
            TimeframeRole::Medium => write!(f, "medium"),
            TimeframeRole::Slow => write!(f, "slow"),
        }
    }
}

/// Directional position held by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionState {
    #[default]
    Idle,
    Long,
    Short,
}

impl PositionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionState::Idle => "IDLE",
            PositionState::Long => "LONG",
            PositionState::Short => "SHORT",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, PositionState::Idle)
    }
}

impl std::fmt::Display for PositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionState {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "IDLE" => Ok(PositionState::Idle),
            "LONG" => Ok(PositionState::Long),
            "SHORT" => Ok(PositionState::Short),
            other => Err(MonitorError::CorruptState(format!(
                "unknown position value {:?}",
                other
            ))),
        }
    }
}

/// Persisted position: the state plus the price it was opened at
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionRecord {
    pub state: PositionState,
    /// Only set while a position is open
    pub entry_price: Option<f64>,
}

impl PositionRecord {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn open(state: PositionState, entry_price: f64) -> Self {
        Self {
            state,
            entry_price: Some(entry_price),
        }
    }
}

/// Alert category understood by alert sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    EntryLong,
    EntryShort,
    Exit,
    Info,
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCategory::EntryLong => write!(f, "entry_long"),
            AlertCategory::EntryShort => write!(f, "entry_short"),
            AlertCategory::Exit => write!(f, "exit"),
            AlertCategory::Info => write!(f, "info"),
        }
    }
}

/// One sample of the per-cycle price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub rsi: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(minute: i64, close: f64, volume: f64) -> Candle {
        let ts = Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap();
        Candle::new(ts, close, close, close, close, volume)
    }

    #[test]
    fn test_series_accepts_ascending_bars() {
        let series = CandleSeries::new(vec![bar(0, 1.0, 1.0), bar(1, 2.0, 0.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 2.0]);
        assert_eq!(series.last().unwrap().close, 2.0);
    }

    #[test]
    fn test_series_rejects_duplicate_timestamps() {
        let result = CandleSeries::new(vec![bar(0, 1.0, 1.0), bar(0, 2.0, 1.0)]);
        assert!(matches!(result, Err(MonitorError::InvalidSeries(_))));
    }

    #[test]
    fn test_series_rejects_negative_volume() {
        let result = CandleSeries::new(vec![bar(0, 1.0, -1.0)]);
        assert!(matches!(result, Err(MonitorError::InvalidSeries(_))));
    }

    #[test]
    fn test_series_rejects_nan() {
        let result = CandleSeries::new(vec![bar(0, f64::NAN, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_position_state_text_round_trip() {
        for state in [PositionState::Idle, PositionState::Long, PositionState::Short] {
            assert_eq!(state.as_str().parse::<PositionState>().unwrap(), state);
        }
        assert!("FLAT".parse::<PositionState>().is_err());
        assert_eq!(PositionState::default(), PositionState::Idle);
    }
}
