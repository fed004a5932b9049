//! Alert sinks

pub mod telegram;

pub use telegram::TelegramAlerts;
