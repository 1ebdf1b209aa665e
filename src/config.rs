//! Configuration for nav-guidance
//!
//! All settings have sensible defaults, so `Config::default()` is a working
//! configuration. Durations serialize as integer seconds except where a
//! field documents millisecond resolution.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level library configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Guidance image fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Trip status notification refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Guidance image fetch settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// TCP connect timeout (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Total per-request timeout covering connect, response, and body read
    /// (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Trip status notification refresh settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Delay between notification updates, in milliseconds (default: 1000 ms)
    #[serde(default = "default_refresh_interval", with = "duration_millis_serde")]
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_refresh_interval() -> Duration {
    Duration::from_millis(1000)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds, for sub-second intervals);
// shared with the notification payloads
pub(crate) mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
