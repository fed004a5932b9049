//! Named rule profiles
//!
//! A profile only supplies defaults; the config file and environment
//! still override every value it sets.

use config::{builder::DefaultState, ConfigBuilder};

use crate::common::errors::{MonitorError, Result};

/// Parameter set distinguishing one strategy variant from another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleProfile {
    pub name: &'static str,
    pub ema_short: usize,
    pub ema_long: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub medium_interval: &'static str,
}

/// EMA 6/99 channel, RSI 35/65, 5m confirmation
pub const SOL: RuleProfile = RuleProfile {
    name: "sol",
    ema_short: 6,
    ema_long: 99,
    rsi_oversold: 35.0,
    rsi_overbought: 65.0,
    medium_interval: "5m",
};

/// EMA 9/21, RSI 30/70, 15m confirmation
pub const CLASSIC: RuleProfile = RuleProfile {
    name: "classic",
    ema_short: 9,
    ema_long: 21,
    rsi_oversold: 30.0,
    rsi_overbought: 70.0,
    medium_interval: "15m",
};

pub const PROFILES: [RuleProfile; 2] = [SOL, CLASSIC];

/// Look up a profile by name (case-insensitive)
pub fn find_profile(name: &str) -> Option<RuleProfile> {
    PROFILES
        .iter()
        .copied()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

impl RuleProfile {
    /// Register this profile's values as defaults on a config builder
    pub fn apply_defaults(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>> {
        let builder = builder
            .set_default("profile", self.name)?
            .set_default("indicators.ema_short", self.ema_short as i64)?
            .set_default("indicators.ema_long", self.ema_long as i64)?
            .set_default("rules.rsi_oversold", self.rsi_oversold)?
            .set_default("rules.rsi_overbought", self.rsi_overbought)?
            .set_default("timeframes.medium", self.medium_interval)?;
        Ok(builder)
    }
}

/// Resolve a profile name or fail with the list of known profiles
pub fn require_profile(name: &str) -> Result<RuleProfile> {
    find_profile(name).ok_or_else(|| {
        let known: Vec<&str> = PROFILES.iter().map(|p| p.name).collect();
        MonitorError::Configuration(format!(
            "unknown profile {:?}, expected one of {}",
            name,
            known.join(", ")
        ))
    })
}
