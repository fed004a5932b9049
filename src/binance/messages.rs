//! Binance REST payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::errors::{MonitorError, Result};
use crate::common::types::{Candle, CandleSeries};

/// One row of `/api/v3/klines`
///
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
/// trades, taker_base, taker_quote, ignore]`; only the first six are used.
pub type KlineRow = Vec<Value>;

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Response from `/api/v3/account`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub balances: Vec<AssetBalance>,
}

impl AccountResponse {
    /// Free balance of `asset`, zero when the asset is not listed
    pub fn free(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// Binance symbol for a `BASE/QUOTE` pair
pub fn exchange_symbol(symbol: &str) -> String {
    symbol.replace('/', "").to_uppercase()
}

/// Decode one kline row into a candle
pub fn parse_kline(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(MonitorError::InvalidResponse(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| MonitorError::InvalidResponse(format!("bad open time {}", row[0])))?;
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| MonitorError::InvalidResponse(format!("open time out of range {}", open_time)))?;

    Ok(Candle::new(
        timestamp,
        number(&row[1], "open")?,
        number(&row[2], "high")?,
        number(&row[3], "low")?,
        number(&row[4], "close")?,
        number(&row[5], "volume")?,
    ))
}

/// Decode a full klines response, validating the series
pub fn parse_klines(rows: &[KlineRow]) -> Result<CandleSeries> {
    let candles = rows
        .iter()
        .map(|row| parse_kline(row))
        .collect::<Result<Vec<_>>>()?;
    CandleSeries::new(candles)
}

/// Binance sends prices as strings; accept plain numbers too
fn number(value: &Value, field: &str) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| MonitorError::InvalidResponse(format!("bad {} value {}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_kline_strings_and_numbers() {
        let row = json!([1_700_000_000_000i64, "25.10", "25.50", 24.9, "25.3", "1200.5", 1_700_000_059_999i64, "0", 10, "0", "0", "0"]);
        let candle = parse_kline(row.as_array().unwrap()).unwrap();
        assert_eq!(candle.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(candle.open, 25.10);
        assert_eq!(candle.low, 24.9);
        assert_eq!(candle.close, 25.3);
        assert_eq!(candle.volume, 1200.5);
    }

    #[test]
    fn test_parse_kline_rejects_garbage() {
        assert!(parse_kline(json!([1, "1", "1"]).as_array().unwrap()).is_err());
        assert!(parse_kline(json!(["x", "1", "1", "1", "1", "1"]).as_array().unwrap()).is_err());
        assert!(parse_kline(json!([1, "1", "abc", "1", "1", "1"]).as_array().unwrap()).is_err());
    }

    #[test]
    fn test_parse_klines_validates_order() {
        let rows: Vec<KlineRow> = serde_json::from_value(json!([
            [120_000, "1", "1", "1", "1", "1"],
            [60_000, "1", "1", "1", "1", "1"]
        ]))
        .unwrap();
        assert!(matches!(
            parse_klines(&rows),
            Err(MonitorError::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_account_free_balance() {
        let account: AccountResponse = serde_json::from_value(json!({
            "canTrade": true,
            "balances": [
                {"asset": "SOL", "free": "1.5", "locked": "0"},
                {"asset": "USDT", "free": "250.75", "locked": "10.00"}
            ]
        }))
        .unwrap();
        assert_eq!(account.free("USDT"), dec!(250.75));
        assert_eq!(account.free("BTC"), Decimal::ZERO);
    }

    #[test]
    fn test_exchange_symbol() {
        assert_eq!(exchange_symbol("SOL/USDT"), "SOLUSDT");
        assert_eq!(exchange_symbol("ethusdt"), "ETHUSDT");
    }
}
