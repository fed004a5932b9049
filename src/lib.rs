//! CandleSignalMonitor Library
//!
//! Polls exchange candles on three timeframes, derives technical
//! indicators, and tracks a single long/short position driven by
//! multi-timeframe entry and exit rules.

pub mod alerts;
pub mod binance;
pub mod common;
pub mod config;
pub mod indicators;
pub mod monitor;
pub mod position;
pub mod store;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{MonitorError, Result};
pub use common::traits::{AlertSink, BalanceSource, CandleSource, StateStore};
pub use common::types::{
    AlertCategory, Candle, CandleSeries, HistoryPoint, PositionRecord, PositionState,
    TimeframeRole,
};
pub use config::types::AppConfig;
pub use indicators::{enrich, IndicatorError, IndicatorFrame, IndicatorRow};

// Adapters
pub use alerts::TelegramAlerts;
pub use binance::{BinanceClient, BinanceRestClient};
pub use store::{InMemoryStateStore, SqliteStateStore};

// Decision pipeline
pub use monitor::{CycleOutcome, Monitor, RsiZone, SkipReason, StatusSnapshot};
pub use position::{ExecutionIntent, ExecutionPort, NoopExecution, PositionStateMachine, Transition};
pub use strategy::{
    PositionSizer, SignalDecision, SignalRules, TimeframeFrames, TrendChannelRules,
};
