//! Configuration file parsing for rxdesk
//!
//! Supports:
//! - `.rxdesk/config.toml` - Backend location, timeouts, fallback switch
//! - `.rxdesk/session.toml` - Persisted session keys

pub mod settings;
pub mod store;
pub mod types;

pub use settings::{init_config_dir, load_settings, rxdesk_dir, BASE_URL_ENV_VAR};
pub use store::{MemorySettingsStore, SettingsStore, TomlSettingsStore};
pub use types::*;
