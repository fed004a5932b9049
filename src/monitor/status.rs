//! One-shot market status
//!
//! Fetches and enriches the three timeframes once and reports the latest
//! price, the RSI per timeframe and the persisted position, without
//! evaluating any rule.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::common::types::{PositionRecord, TimeframeRole};
use crate::config::types::TimeframeConfig;
use crate::strategy::TimeframeFrames;

/// RSI band a reading falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub const OVERBOUGHT: f64 = 70.0;
    pub const OVERSOLD: f64 = 30.0;

    /// Strictly above 70 or strictly below 30; the bounds themselves are neutral
    pub fn classify(rsi: f64) -> Self {
        if rsi > Self::OVERBOUGHT {
            RsiZone::Overbought
        } else if rsi < Self::OVERSOLD {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiZone::Overbought => write!(f, "overbought"),
            RsiZone::Oversold => write!(f, "oversold"),
            RsiZone::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeReading {
    pub role: TimeframeRole,
    pub interval: String,
    pub rsi: f64,
    pub zone: RsiZone,
}

/// Price, per-timeframe RSI and the stored position at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub symbol: String,
    pub price: f64,
    pub readings: Vec<TimeframeReading>,
    pub position: PositionRecord,
    pub taken_at: DateTime<Utc>,
}

impl StatusSnapshot {
    /// `None` when any frame has no bars
    pub fn from_frames(
        symbol: &str,
        timeframes: &TimeframeConfig,
        frames: &TimeframeFrames,
        position: PositionRecord,
    ) -> Option<Self> {
        let price = frames.price()?;
        let readings = TimeframeRole::ALL
            .iter()
            .map(|&role| {
                let rsi = frames.get(role).last()?.rsi;
                Some(TimeframeReading {
                    role,
                    interval: timeframes.interval(role).to_string(),
                    rsi,
                    zone: RsiZone::classify(rsi),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            symbol: symbol.to_string(),
            price,
            readings,
            position,
            taken_at: Utc::now(),
        })
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} @ {:.4}  ({})",
            self.symbol,
            self.price,
            self.taken_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        match self.position.entry_price {
            Some(entry) => writeln!(f, "position: {} since {:.4}", self.position.state, entry)?,
            None => writeln!(f, "position: {}", self.position.state)?,
        }
        for reading in &self.readings {
            writeln!(
                f,
                "  {:<6} {:>4}  RSI {:>5.1}  {}",
                reading.role.to_string(),
                reading.interval,
                reading.rsi,
                reading.zone
            )?;
        }
        Ok(())
    }
}
