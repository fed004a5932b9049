//! Telegram Bot API alert sink

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::common::errors::{MonitorError, Result};
use crate::common::traits::AlertSink;
use crate::common::types::AlertCategory;
use crate::config::types::TelegramConfig;

/// Prefix shown in front of every message of a category
pub fn emoji(category: AlertCategory) -> &'static str {
    match category {
        AlertCategory::EntryLong => "🟢",
        AlertCategory::EntryShort => "🔴",
        AlertCategory::Exit => "⚠️",
        AlertCategory::Info => "ℹ️",
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
struct BotTarget {
    token: String,
    chat_id: String,
}

/// Sends alerts through `sendMessage`, or only logs them when unconfigured
#[derive(Debug, Clone)]
pub struct TelegramAlerts {
    client: Client,
    api_url: String,
    target: Option<BotTarget>,
}

impl TelegramAlerts {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Internal(e.to_string()))?;

        let target = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) if config.is_enabled() => Some(BotTarget {
                token: token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };

        if target.is_some() {
            info!("Telegram alerts enabled");
        } else {
            info!("Telegram alerts disabled, logging only");
        }

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            target,
        })
    }

    /// Sink that never leaves the process
    pub fn log_only() -> Self {
        Self {
            client: Client::new(),
            api_url: String::new(),
            target: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Post one message, surfacing delivery failures
    #[instrument(skip(self, text))]
    pub async fn try_send(&self, text: &str) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, target.token);
        let body = SendMessageRequest {
            chat_id: &target.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MonitorError::RateLimit {
                message: "telegram sendMessage".to_string(),
                retry_after_seconds: None,
            });
        }

        let parsed: SendMessageResponse = response.json().await?;
        if !status.is_success() || !parsed.ok {
            return Err(MonitorError::InvalidResponse(format!(
                "telegram returned {}: {}",
                status,
                parsed.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AlertSink for TelegramAlerts {
    async fn send_alert(&self, message: &str, category: AlertCategory) {
        if !self.is_enabled() {
            info!(%category, "[ALERT] {}", message);
            return;
        }

        let text = format!("{} {}", emoji(category), message);
        match self.try_send(&text).await {
            Ok(()) => info!(%category, "Alert delivered"),
            Err(e) => error!(%category, error = %e, "Failed to deliver alert"),
        }
    }
}
