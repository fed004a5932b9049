//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::profiles::require_profile;
use super::types::AppConfig;
use crate::common::errors::{MonitorError, Result};

/// Well-known environment variables mapped onto config keys
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("BINANCE_API_KEY", "exchange.api_key"),
    ("BINANCE_API_SECRET", "exchange.api_secret"),
    ("SANDBOX_MODE", "exchange.sandbox"),
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHAT_ID", "telegram.chat_id"),
    ("DATABASE_URL", "database.url"),
];

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Well-known variables (`BINANCE_API_KEY`, `TELEGRAM_BOT_TOKEN`, ...)
/// 2. Environment variables (prefixed with APP__)
/// 3. Configuration file (TOML format)
/// 4. Profile defaults
/// 5. Default values
pub fn load_config(config_path: Option<&str>, profile: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(name) = profile {
        builder = require_profile(name)?.apply_defaults(builder)?;
    }

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    for (var, key) in ENV_OVERRIDES {
        let value = std::env::var(var).ok().filter(|v| !v.is_empty());
        builder = match (key, value) {
            ("exchange.sandbox", Some(v)) => {
                builder.set_override(key, v.eq_ignore_ascii_case("true"))?
            }
            (_, value) => builder.set_override_option(key, value)?,
        };
    }

    let config = builder
        .build()
        .map_err(|e| MonitorError::Configuration(e.to_string()))?;

    let app: AppConfig = config
        .try_deserialize()
        .map_err(|e| MonitorError::Configuration(e.to_string()))?;

    app.validate()?;
    Ok(app)
}

/// Load configuration from environment variables only
pub fn load_from_env(profile: Option<&str>) -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();
    load_config(None, profile)
}
