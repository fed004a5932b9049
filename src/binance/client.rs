//! Binance client exposed through the monitor's source traits

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, instrument};

use super::rest::BinanceRestClient;
use crate::common::errors::Result;
use crate::common::traits::{BalanceSource, CandleSource};
use crate::common::types::CandleSeries;
use crate::config::types::{ApiCredentials, ExchangeConfig};

/// Candle and balance source backed by the Binance spot REST API
#[derive(Debug, Clone)]
pub struct BinanceClient {
    rest_client: BinanceRestClient,
    sandbox: bool,
}

impl BinanceClient {
    /// Create a client from configuration
    pub fn new(config: &ExchangeConfig, timeout: Duration) -> Result<Self> {
        let rest_client = BinanceRestClient::with_timeout(config.base_url(), timeout)?;

        let rest_client = match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) if config.is_api_enabled() => {
                rest_client.with_credentials(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => rest_client,
        };

        info!(
            base_url = rest_client.base_url(),
            sandbox = config.sandbox,
            signed = rest_client.has_credentials(),
            "Binance client ready"
        );

        Ok(Self {
            rest_client,
            sandbox: config.sandbox,
        })
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &BinanceRestClient {
        &self.rest_client
    }

    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Whether balance lookups are possible
    pub fn can_sign(&self) -> bool {
        self.rest_client.has_credentials()
    }

    pub async fn check_health(&self) -> Result<bool> {
        self.rest_client.ping().await
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    #[instrument(skip(self))]
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<CandleSeries> {
        self.rest_client.get_klines(symbol, interval, limit).await
    }

    fn source_name(&self) -> &'static str {
        "Binance"
    }
}

#[async_trait]
impl BalanceSource for BinanceClient {
    async fn free_balance(&self, asset: &str) -> Result<Decimal> {
        self.rest_client.get_free_balance(asset).await
    }
}
