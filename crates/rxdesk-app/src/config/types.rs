//! Configuration types for rxdesk
//!
//! Defines:
//! - `Settings` - Global settings from `.rxdesk/config.toml`
//! - `ApiSettings` - Backend location, timeouts and page size
//! - `FallbackSettings` - Whether built-in demo data backs failed fetches

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";

/// Global application settings from .rxdesk/config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub fallback: FallbackSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout; expiry surfaces as a network failure
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// `limit` sent to paginated collections
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl ApiSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

/// Fallback data settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FallbackSettings {
    /// Register the built-in demo orders and appointments
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
