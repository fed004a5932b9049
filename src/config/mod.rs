//! Configuration: typed settings, named profiles and the layered loader

pub mod loader;
pub mod profiles;
pub mod types;

pub use loader::{load_config, load_from_env};
pub use profiles::{find_profile, RuleProfile};
pub use types::{
    AppConfig, IndicatorParams, MonitorConfig, RiskConfig, RsiSmoothing, RuleConfig,
    TimeframeConfig,
};
