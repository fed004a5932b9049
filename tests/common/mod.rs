//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use candle_signal_monitor::common::errors::{MonitorError, Result};
use candle_signal_monitor::common::types::{
    AlertCategory, Candle, CandleSeries, HistoryPoint, PositionRecord,
};
use candle_signal_monitor::config::types::AppConfig;
use candle_signal_monitor::{
    AlertSink, CandleSource, IndicatorFrame, IndicatorRow, StateStore, TimeframeFrames,
};

pub const START_TS: i64 = 1_704_067_200;

/// Default config with near-instant retries
pub static TEST_CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let mut config = AppConfig::default();
    config.monitor.retry_base_delay_ms = 1;
    config
});

/// Closes that wander up and down so RSI has gains and losses
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 140.0 + (i as f64 * 0.35).sin() * 3.0 + (i as f64 * 0.05).cos())
        .collect()
}

pub fn wave_series(n: usize) -> CandleSeries {
    let candles = wave_closes(n)
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let ts = Utc.timestamp_opt(START_TS + i as i64 * 60, 0).unwrap();
            Candle::new(ts, c, c + 0.4, c - 0.4, c, 500.0 + i as f64)
        })
        .collect();
    CandleSeries::new(candles).unwrap()
}

/// `/api/v3/klines` body for a wave series
pub fn klines_body(n: usize) -> Value {
    let rows: Vec<Value> = wave_closes(n)
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let open_ms = (START_TS + i as i64 * 60) * 1000;
            json!([
                open_ms,
                format!("{:.4}", c),
                format!("{:.4}", c + 0.4),
                format!("{:.4}", c - 0.4),
                format!("{:.4}", c),
                format!("{:.2}", 500.0 + i as f64),
                open_ms + 59_999,
                "0",
                12,
                "0",
                "0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

// ============================================================================
// Frame builders
// ============================================================================

pub fn row(i: i64, close: f64) -> IndicatorRow {
    let ts = Utc.timestamp_opt(START_TS + i * 60, 0).unwrap();
    IndicatorRow::neutral(&Candle::new(ts, close, close, close, close, 1.0))
}

/// Slow frame in an uptrend: close above EMA_long, positive histogram
pub fn slow_uptrend() -> IndicatorFrame {
    let mut last = row(1, 110.0);
    last.ema_long = 100.0;
    last.macd_hist = 0.5;
    IndicatorFrame::from_rows(vec![row(0, 108.0), last])
}

/// Medium frame above EMA_short with neutral RSI and room below the upper band
pub fn medium_confirming(close: f64, bbu: f64) -> IndicatorFrame {
    let rows = (0..3)
        .map(|i| {
            let mut r = row(i, close);
            r.ema_short = 99.0;
            r.rsi = 50.0;
            r.bbp = 0.5;
            r.bbu = bbu;
            r.bbl = 90.0;
            r.macd_hist = 0.1 * (i + 1) as f64;
            r
        })
        .collect();
    IndicatorFrame::from_rows(rows)
}

/// Fast frame hugging EMA_short with the given trailing volumes
pub fn fast_timing(volumes: [f64; 3]) -> IndicatorFrame {
    let rows = volumes
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let mut r = row(i as i64, 100.0);
            r.ema_short = 100.05;
            r.volume = *v;
            r
        })
        .collect();
    IndicatorFrame::from_rows(rows)
}

pub fn long_entry_frames() -> TimeframeFrames {
    TimeframeFrames::new(
        fast_timing([10.0, 20.0, 30.0]),
        medium_confirming(100.0, 105.0),
        slow_uptrend(),
    )
}

// ============================================================================
// Collaborator fakes
// ============================================================================

/// Candle source returning a fixed series per interval
pub struct ScriptedSource {
    series: HashMap<String, CandleSeries>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn uniform(series: CandleSeries) -> Self {
        Self::per_interval(series.clone(), series.clone(), series)
    }

    /// Distinct series for the 1m, 5m and 1h intervals
    pub fn per_interval(fast: CandleSeries, medium: CandleSeries, slow: CandleSeries) -> Self {
        let series = [("1m", fast), ("5m", medium), ("1h", slow)]
            .into_iter()
            .map(|(iv, s)| (iv.to_string(), s))
            .collect();
        Self {
            series,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CandleSource for ScriptedSource {
    async fn fetch_candles(&self, _symbol: &str, interval: &str, _limit: u32) -> Result<CandleSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(interval)
            .cloned()
            .ok_or_else(|| MonitorError::InvalidResponse(format!("no data for {}", interval)))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Alert sink that remembers everything it was sent
#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: Mutex<Vec<(String, AlertCategory)>>,
}

impl RecordingAlerts {
    pub fn categories(&self) -> Vec<AlertCategory> {
        self.sent.lock().unwrap().iter().map(|(_, c)| *c).collect()
    }
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn send_alert(&self, message: &str, category: AlertCategory) {
        self.sent.lock().unwrap().push((message.to_string(), category));
    }
}

/// Store whose writes always fail
pub struct ReadOnlyStore(pub PositionRecord);

#[async_trait]
impl StateStore for ReadOnlyStore {
    async fn load_position(&self) -> Result<PositionRecord> {
        Ok(self.0)
    }

    async fn save_position(&self, _record: &PositionRecord) -> Result<()> {
        Err(MonitorError::Internal("store is read-only".to_string()))
    }

    async fn record_history(&self, _point: &HistoryPoint) -> Result<()> {
        Err(MonitorError::Internal("store is read-only".to_string()))
    }
}
