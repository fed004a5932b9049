//! Request signing for Binance signed endpoints

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{MonitorError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default `recvWindow` in milliseconds
pub const DEFAULT_RECV_WINDOW: u64 = 5_000;

/// HMAC-SHA256 of the query string, hex encoded
///
/// # Arguments
/// * `secret` - API secret (used as raw bytes)
/// * `query` - URL-encoded query string exactly as it will be sent
pub fn sign_query(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| MonitorError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Append `recvWindow`, `timestamp` and `signature` to a query string
pub fn signed_query(
    secret: &str,
    query: &str,
    timestamp_ms: i64,
    recv_window: u64,
) -> Result<String> {
    let mut payload = String::from(query);
    if !payload.is_empty() {
        payload.push('&');
    }
    payload.push_str(&format!(
        "recvWindow={}&timestamp={}",
        recv_window, timestamp_ms
    ));
    let signature = sign_query(secret, &payload)?;
    Ok(format!("{}&signature={}", payload, signature))
}
