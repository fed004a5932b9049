//! Enriched candle frame and the enrichment pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bollinger::bollinger;
use super::ema::ema;
use super::fill::filled;
use super::macd::macd;
use super::rsi::rsi;
use super::IndicatorError;
use crate::common::types::{Candle, CandleSeries};
use crate::config::types::IndicatorParams;

/// One bar with every derived indicator value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Bollinger middle band
    pub bbm: f64,
    /// Bollinger upper band
    pub bbu: f64,
    /// Bollinger lower band
    pub bbl: f64,
    /// Bollinger %B
    pub bbp: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
}

impl IndicatorRow {
    /// Row whose indicators all sit at the close price (RSI 50, %B 0.5, MACD 0)
    pub fn neutral(candle: &Candle) -> Self {
        Self {
            timestamp: candle.timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            bbm: candle.close,
            bbu: candle.close,
            bbl: candle.close,
            bbp: 0.5,
            ema_short: candle.close,
            ema_long: candle.close,
            macd: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            rsi: 50.0,
        }
    }
}

/// Candle series enriched with indicators, oldest row first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Row `back` positions before the last (`0` is the last row)
    pub fn from_end(&self, back: usize) -> Option<&IndicatorRow> {
        self.rows.len().checked_sub(back + 1).map(|i| &self.rows[i])
    }

    /// Trailing `count` volumes, oldest first
    pub fn last_volumes(&self, count: usize) -> Option<Vec<f64>> {
        let start = self.rows.len().checked_sub(count)?;
        Some(self.rows[start..].iter().map(|r| r.volume).collect())
    }
}

/// Derive every indicator for `series`
///
/// Warm-up gaps are forward-filled then back-filled and only the most
/// recent `params.retain_bars` rows are returned.
pub fn enrich(
    series: &CandleSeries,
    params: &IndicatorParams,
) -> Result<IndicatorFrame, IndicatorError> {
    let required = params.required_bars();
    if series.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            available: series.len(),
        });
    }

    let closes = series.closes();
    let bb = bollinger(&closes, params.bb_length, params.bb_std);
    let ema_short = ema(&closes, params.ema_short);
    let ema_long = ema(&closes, params.ema_long);
    let macd_cols = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
    let rsi_col = rsi(&closes, params.rsi_length, params.rsi_smoothing);

    let bbm = filled(bb.middle).ok_or(IndicatorError::Undefined { field: "bbm" })?;
    let bbu = filled(bb.upper).ok_or(IndicatorError::Undefined { field: "bbu" })?;
    let bbl = filled(bb.lower).ok_or(IndicatorError::Undefined { field: "bbl" })?;
    let bbp = filled(bb.percent).ok_or(IndicatorError::Undefined { field: "bbp" })?;
    let rsi_col = filled(rsi_col).ok_or(IndicatorError::Undefined { field: "rsi" })?;

    let skip = series.len().saturating_sub(params.retain_bars);
    let rows: Vec<IndicatorRow> = series
        .candles()
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, c)| IndicatorRow {
            timestamp: c.timestamp,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            bbm: bbm[i],
            bbu: bbu[i],
            bbl: bbl[i],
            bbp: bbp[i],
            ema_short: ema_short[i],
            ema_long: ema_long[i],
            macd: macd_cols.macd[i],
            macd_signal: macd_cols.signal[i],
            macd_hist: macd_cols.hist[i],
            rsi: rsi_col[i],
        })
        .collect();

    debug!(
        input_bars = series.len(),
        retained = rows.len(),
        "enriched candle series"
    );

    Ok(IndicatorFrame { rows })
}
