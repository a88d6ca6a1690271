//! Configuration management for the booking client.
//!
//! Loads configuration from environment variables with sensible defaults.

use lesson_booking_runtime::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Base URL of the lesson service (`BOOKING_BACKEND_URL`)
    pub backend_url: String,
    /// Timeout applied to every request (`BOOKING_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,
    /// Retry settings for space writes
    pub sync: SyncConfig,
    /// How long an order confirmation stays visible (`BOOKING_CONFIRMATION_SECS`)
    pub confirmation_display: Duration,
    /// Show the demo catalog when the first load fails (`BOOKING_DEMO_FALLBACK`)
    pub demo_fallback: bool,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Retry settings for `PUT /api/lessons/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Retries after the first attempt (`BOOKING_SYNC_MAX_RETRIES`)
    pub max_retries: usize,
    /// First backoff delay (`BOOKING_SYNC_INITIAL_DELAY_MS`)
    pub initial_delay: Duration,
    /// Backoff cap (`BOOKING_SYNC_MAX_DELAY_MS`)
    pub max_delay: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl BookingConfig {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    ///
    /// Missing or unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            backend_url: lookup("BOOKING_BACKEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            request_timeout: Duration::from_secs(number("BOOKING_REQUEST_TIMEOUT_SECS", 10)),
            sync: SyncConfig {
                max_retries: lookup("BOOKING_SYNC_MAX_RETRIES")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(3),
                initial_delay: Duration::from_millis(number("BOOKING_SYNC_INITIAL_DELAY_MS", 200)),
                max_delay: Duration::from_millis(number("BOOKING_SYNC_MAX_DELAY_MS", 5_000)),
            },
            confirmation_display: Duration::from_secs(number("BOOKING_CONFIRMATION_SECS", 3)),
            demo_fallback: lookup("BOOKING_DEMO_FALLBACK")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(true),
            log_filter: lookup("BOOKING_LOG")
                .unwrap_or_else(|| "lesson_booking=info,lesson_booking_runtime=info".to_string()),
        }
    }

    /// Backoff policy for space writes
    #[must_use]
    pub fn sync_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.sync.max_retries)
            .initial_delay(self.sync.initial_delay)
            .max_delay(self.sync.max_delay.max(self.sync.initial_delay))
            .jitter(true)
            .build()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
