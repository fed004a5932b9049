//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::errors::{MonitorError, Result};
use crate::common::types::TimeframeRole;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Traded pair, `BASE/QUOTE`
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Name of the rule profile that supplied the defaults, if any
    #[serde(default)]
    pub profile: Option<String>,
    /// Exchange connection settings
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Interval bound to each timeframe role
    #[serde(default)]
    pub timeframes: TimeframeConfig,
    /// Indicator parameters
    #[serde(default)]
    pub indicators: IndicatorParams,
    /// Entry/exit rule parameters
    #[serde(default)]
    pub rules: RuleConfig,
    /// Risk parameters
    #[serde(default)]
    pub risk: RiskConfig,
    /// Polling loop settings
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Telegram alert settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Database configuration (in-memory state when absent)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            profile: None,
            exchange: ExchangeConfig::default(),
            timeframes: TimeframeConfig::default(),
            indicators: IndicatorParams::default(),
            rules: RuleConfig::default(),
            risk: RiskConfig::default(),
            monitor: MonitorConfig::default(),
            telegram: TelegramConfig::default(),
            database: None,
            settings: AppSettings::default(),
        }
    }
}

fn default_symbol() -> String {
    "SOL/USDT".to_string()
}

impl AppConfig {
    /// Reject parameter combinations the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !self.symbol.contains('/') {
            errors.push(format!("symbol {:?} must be BASE/QUOTE", self.symbol));
        }

        let ind = &self.indicators;
        for (name, value) in [
            ("bb_length", ind.bb_length),
            ("ema_short", ind.ema_short),
            ("ema_long", ind.ema_long),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
            ("rsi_length", ind.rsi_length),
        ] {
            if value == 0 {
                errors.push(format!("indicators.{} must be positive", name));
            }
        }
        if ind.bb_std <= 0.0 {
            errors.push("indicators.bb_std must be positive".to_string());
        }
        if ind.ema_short >= ind.ema_long {
            errors.push("indicators.ema_short must be shorter than ema_long".to_string());
        }
        if ind.macd_fast >= ind.macd_slow {
            errors.push("indicators.macd_fast must be shorter than macd_slow".to_string());
        }
        if ind.retain_bars < 3 {
            errors.push("indicators.retain_bars must keep at least 3 bars".to_string());
        }

        let rules = &self.rules;
        if !(0.0..=100.0).contains(&rules.rsi_oversold)
            || !(0.0..=100.0).contains(&rules.rsi_overbought)
        {
            errors.push("rules.rsi thresholds must lie in [0, 100]".to_string());
        }
        if rules.entry_tolerance_pct < 0.0 {
            errors.push("rules.entry_tolerance_pct must not be negative".to_string());
        }
        if rules.volume_lookback < 2 {
            errors.push("rules.volume_lookback must be at least 2".to_string());
        }

        if self.risk.max_positions != 1 {
            errors.push("risk.max_positions must be 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.risk.risk_per_trade) {
            errors.push("risk.risk_per_trade must be a fraction in [0, 1]".to_string());
        }

        if self.monitor.min_data_bars < self.indicators.required_bars() {
            errors.push(format!(
                "monitor.min_data_bars ({}) is below the indicator lookback ({})",
                self.monitor.min_data_bars,
                self.indicators.required_bars()
            ));
        }
        if (self.monitor.fetch_limit as usize) < self.monitor.min_data_bars {
            errors.push("monitor.fetch_limit must be at least min_data_bars".to_string());
        }
        if self.monitor.check_interval_seconds == 0 {
            errors.push("monitor.check_interval_seconds must be positive".to_string());
        }
        if self.monitor.error_cooldown_seconds <= self.monitor.check_interval_seconds {
            errors.push(format!(
                "monitor.error_cooldown_seconds ({}) must exceed check_interval_seconds ({})",
                self.monitor.error_cooldown_seconds, self.monitor.check_interval_seconds
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MonitorError::Configuration(errors.join("; ")))
        }
    }

    /// Base and quote asset of the configured symbol
    pub fn assets(&self) -> (&str, &str) {
        self.symbol.split_once('/').unwrap_or((self.symbol.as_str(), ""))
    }
}

/// Exchange connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Base URL for the production REST API
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Base URL used when `sandbox` is set
    #[serde(default = "default_testnet_url")]
    pub testnet_url: String,
    /// Use the testnet endpoint
    #[serde(default)]
    pub sandbox: bool,
    /// API key for signed account requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            testnet_url: default_testnet_url(),
            sandbox: false,
            api_key: None,
            api_secret: None,
        }
    }
}

impl ExchangeConfig {
    /// URL that requests should go to
    pub fn base_url(&self) -> &str {
        if self.sandbox {
            &self.testnet_url
        } else {
            &self.rest_url
        }
    }

    /// Whether signed endpoints can be used
    pub fn is_api_enabled(&self) -> bool {
        matches!((&self.api_key, &self.api_secret), (Some(k), Some(s)) if !k.is_empty() && !s.is_empty())
    }
}

fn default_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_testnet_url() -> String {
    "https://testnet.binance.vision".to_string()
}

/// Exchange interval bound to each timeframe role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    #[serde(default = "default_fast")]
    pub fast: String,
    #[serde(default = "default_medium")]
    pub medium: String,
    #[serde(default = "default_slow")]
    pub slow: String,
}

impl Default for TimeframeConfig {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            medium: default_medium(),
            slow: default_slow(),
        }
    }
}

impl TimeframeConfig {
    pub fn interval(&self, role: TimeframeRole) -> &str {
        match role {
            TimeframeRole::Fast => &self.fast,
            TimeframeRole::Medium => &self.medium,
            TimeframeRole::Slow => &self.slow,
        }
    }
}

fn default_fast() -> String {
    "1m".to_string()
}

fn default_medium() -> String {
    "5m".to_string()
}

fn default_slow() -> String {
    "1h".to_string()
}

/// Averaging used for RSI gains and losses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Rolling arithmetic mean over the window
    #[default]
    Simple,
    /// Wilder's recursive smoothing
    Wilder,
}

/// Indicator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_bb_length")]
    pub bb_length: usize,
    #[serde(default = "default_bb_std")]
    pub bb_std: f64,
    #[serde(default = "default_ema_short")]
    pub ema_short: usize,
    #[serde(default = "default_ema_long")]
    pub ema_long: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    #[serde(default = "default_rsi_length")]
    pub rsi_length: usize,
    #[serde(default)]
    pub rsi_smoothing: RsiSmoothing,
    /// Rows kept after enrichment
    #[serde(default = "default_retain_bars")]
    pub retain_bars: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            bb_length: default_bb_length(),
            bb_std: default_bb_std(),
            ema_short: default_ema_short(),
            ema_long: default_ema_long(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            rsi_length: default_rsi_length(),
            rsi_smoothing: RsiSmoothing::Simple,
            retain_bars: default_retain_bars(),
        }
    }
}

impl IndicatorParams {
    /// Minimum series length the engine accepts
    pub fn required_bars(&self) -> usize {
        [
            self.bb_length,
            self.ema_short,
            self.ema_long,
            self.macd_slow,
            self.rsi_length + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

fn default_bb_length() -> usize {
    20
}

fn default_bb_std() -> f64 {
    2.0
}

fn default_ema_short() -> usize {
    6
}

fn default_ema_long() -> usize {
    99
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_rsi_length() -> usize {
    14
}

fn default_retain_bars() -> usize {
    100
}

/// Entry and exit rule parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Long entries need medium RSI at or above this floor
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    /// Short entries need medium RSI at or below this ceiling
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    /// Max distance of fast close from fast EMA_short, percent of the EMA
    #[serde(default = "default_entry_tolerance_pct")]
    pub entry_tolerance_pct: f64,
    /// Long entries are refused above this %B on medium
    #[serde(default = "default_upper_band_guard")]
    pub upper_band_guard: f64,
    /// Short entries are refused below this %B on medium
    #[serde(default = "default_lower_band_guard")]
    pub lower_band_guard: f64,
    /// Number of trailing fast volumes that must be rising
    #[serde(default = "default_volume_lookback")]
    pub volume_lookback: usize,
    /// Accept equal consecutive volumes as rising
    #[serde(default)]
    pub volume_allow_ties: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            entry_tolerance_pct: default_entry_tolerance_pct(),
            upper_band_guard: default_upper_band_guard(),
            lower_band_guard: default_lower_band_guard(),
            volume_lookback: default_volume_lookback(),
            volume_allow_ties: false,
        }
    }
}

fn default_rsi_oversold() -> f64 {
    35.0
}

fn default_rsi_overbought() -> f64 {
    65.0
}

fn default_entry_tolerance_pct() -> f64 {
    0.2
}

fn default_upper_band_guard() -> f64 {
    0.95
}

fn default_lower_band_guard() -> f64 {
    0.05
}

fn default_volume_lookback() -> usize {
    3
}

/// Risk parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of the quote balance committed per entry
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
    /// Exit when the unrealized move against the position reaches this percent
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
    /// Exit when the unrealized move in favour reaches this percent
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
    #[serde(default = "default_max_positions")]
    pub max_positions: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            max_positions: default_max_positions(),
        }
    }
}

fn default_risk_per_trade() -> f64 {
    0.01
}

fn default_stop_loss_pct() -> f64 {
    2.0
}

fn default_take_profit_pct() -> f64 {
    4.0
}

fn default_max_positions() -> u32 {
    1
}

/// Polling loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sleep between cycles in seconds
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Sleep after a failed cycle in seconds
    #[serde(default = "default_error_cooldown")]
    pub error_cooldown_seconds: u64,
    /// Fewer bars than this on any timeframe skips the cycle
    #[serde(default = "default_min_data_bars")]
    pub min_data_bars: usize,
    /// Bars requested per timeframe
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
    /// Attempts per fetch before the cycle is skipped
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// First backoff delay in milliseconds, doubled on each retry
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            error_cooldown_seconds: default_error_cooldown(),
            min_data_bars: default_min_data_bars(),
            fetch_limit: default_fetch_limit(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_seconds)
    }
}

fn default_check_interval() -> u64 {
    30
}

fn default_error_cooldown() -> u64 {
    60
}

fn default_min_data_bars() -> usize {
    100
}

fn default_fetch_limit() -> u32 {
    150
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    500
}

/// Telegram alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: default_telegram_api_url(),
        }
    }
}

impl TelegramConfig {
    pub fn is_enabled(&self) -> bool {
        matches!((&self.bot_token, &self.chat_id), (Some(t), Some(c)) if !t.is_empty() && !c.is_empty())
    }
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Database configuration for the persisted position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL, e.g. `sqlite://trading_data.db`
    pub url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    1
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// API credentials for signed requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.indicators.required_bars(), 99);
        assert_eq!(config.assets(), ("SOL", "USDT"));
        assert_eq!(config.timeframes.interval(TimeframeRole::Medium), "5m");
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = AppConfig::default();
        config.indicators.ema_short = 120;
        config.risk.max_positions = 2;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ema_short"));
        assert!(err.contains("max_positions"));
    }

    #[test]
    fn test_min_bars_must_cover_lookback() {
        let mut config = AppConfig::default();
        config.monitor.min_data_bars = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_polling_cadence_is_checked() {
        let mut config = AppConfig::default();
        config.monitor.check_interval_seconds = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("check_interval_seconds must be positive"));

        config.monitor.check_interval_seconds = 60;
        config.monitor.error_cooldown_seconds = 60;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must exceed check_interval_seconds"));

        config.monitor.error_cooldown_seconds = 61;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sandbox_switches_base_url() {
        let mut exchange = ExchangeConfig::default();
        assert_eq!(exchange.base_url(), "https://api.binance.com");
        exchange.sandbox = true;
        assert_eq!(exchange.base_url(), "https://testnet.binance.vision");
        assert!(!exchange.is_api_enabled());
    }
}
