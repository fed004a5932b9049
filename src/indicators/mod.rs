//! Indicator engine
//!
//! Turns a raw [`CandleSeries`](crate::common::types::CandleSeries) into an
//! [`IndicatorFrame`] carrying Bollinger Bands, short/long EMA, MACD and RSI.
//! Column computations live in one file each and work on plain `f64`
//! slices; undefined warm-up values are `None` until [`enrich`] fills them.

pub mod bollinger;
pub mod ema;
pub mod fill;
pub mod frame;
pub mod macd;
pub mod rsi;

use thiserror::Error;

pub use frame::{enrich, IndicatorFrame, IndicatorRow};

/// Why a series could not be enriched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    /// The series is shorter than the longest lookback
    #[error("insufficient data: {available} bars, need {required}")]
    InsufficientData { required: usize, available: usize },

    /// A column had no defined value anywhere, so filling could not resolve it
    #[error("indicator {field} is undefined over the whole series")]
    Undefined { field: &'static str },
}
