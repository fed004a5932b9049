//! REST API client for Binance spot market data and account endpoints

use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{signed_query, DEFAULT_RECV_WINDOW};
use super::messages::*;
use crate::common::errors::{MonitorError, Result};
use crate::common::types::CandleSeries;
use crate::config::types::ApiCredentials;

/// REST API client for Binance spot
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    /// HTTP client
    client: Client,
    /// Base URL (mainnet or testnet)
    base_url: String,
    /// Optional API credentials for signed endpoints
    credentials: Option<ApiCredentials>,
    recv_window: u64,
}

impl BinanceRestClient {
    /// Create a new REST client (unauthenticated)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            recv_window: DEFAULT_RECV_WINDOW,
        })
    }

    /// Set API credentials for signed requests
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| MonitorError::Configuration(format!("invalid base url: {}", e)))
    }

    // ========================================================================
    // Public Endpoints (No Authentication Required)
    // ========================================================================

    /// Connectivity check
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<bool> {
        let url = self.endpoint("/api/v3/ping", &[])?;
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }

    /// Candles for `symbol` (e.g. `SOL/USDT`), oldest first
    #[instrument(skip(self))]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<CandleSeries> {
        let symbol = exchange_symbol(symbol);
        let limit = limit.to_string();
        let url = self.endpoint(
            "/api/v3/klines",
            &[("symbol", &symbol), ("interval", interval), ("limit", &limit)],
        )?;
        debug!("Fetching klines from: {}", url);

        let response = check_status(self.client.get(url).send().await?).await?;
        let rows: Vec<KlineRow> = response.json().await?;
        let series = parse_klines(&rows)?;
        debug!(bars = series.len(), "Klines received");
        Ok(series)
    }

    // ========================================================================
    // Signed Endpoints (Authentication Required)
    // ========================================================================

    /// Account snapshot with per-asset balances
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> Result<AccountResponse> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            MonitorError::Authentication("API credentials required for account".to_string())
        })?;

        let query = signed_query(
            &creds.api_secret,
            "omitZeroBalances=true",
            chrono::Utc::now().timestamp_millis(),
            self.recv_window,
        )?;
        let url = format!("{}/api/v3/account?{}", self.base_url, query);

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &creds.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Free (unlocked) balance of one asset
    pub async fn get_free_balance(&self, asset: &str) -> Result<Decimal> {
        let account = self.get_account().await?;
        Ok(account.free(asset))
    }
}

/// Map non-success statuses onto typed errors
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_seconds = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| format!("{} ({})", e.msg, e.code))
        .unwrap_or_else(|_| body.clone());

    match status {
        // 418 is an IP ban after ignoring 429s
        StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => {
            warn!(status = status.as_u16(), ?retry_after_seconds, "Rate limited");
            Err(MonitorError::RateLimit {
                message,
                retry_after_seconds,
            })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(MonitorError::Authentication(message))
        }
        s if s.is_server_error() => Err(MonitorError::Server {
            status: s.as_u16(),
            body: message,
        }),
        s => Err(MonitorError::InvalidResponse(format!(
            "Server returned status {}: {}",
            s, message
        ))),
    }
}
