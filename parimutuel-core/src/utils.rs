//! # Utility Functions
//!
//! Common helpers for identifiers and timestamps.

use crate::{error::Result, MarketError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a random 8-character uppercase hex identifier
pub fn generate_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..8].to_uppercase()
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Format timestamp as human-readable string
pub fn format_timestamp(timestamp: u64) -> String {
    use chrono::DateTime;
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse timestamp from string
pub fn parse_timestamp(timestamp_str: &str) -> Result<u64> {
    timestamp_str
        .parse::<u64>()
        .map_err(|_| MarketError::InvalidTiming(format!("invalid timestamp: {timestamp_str}")))
}
