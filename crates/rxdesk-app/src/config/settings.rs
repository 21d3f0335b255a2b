//! Settings parser for .rxdesk/config.toml

use std::path::{Path, PathBuf};

use rxdesk_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
pub(crate) const RXDESK_DIR: &str = ".rxdesk";

/// Environment variable overriding `[api] base_url`
pub const BASE_URL_ENV_VAR: &str = "RXDESK_BASE_URL";

/// Path of the `.rxdesk/` directory under `project_path`
pub fn rxdesk_dir(project_path: &Path) -> PathBuf {
    project_path.join(RXDESK_DIR)
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from .rxdesk/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
/// `RXDESK_BASE_URL`, when set and non-empty, wins over the file.
pub fn load_settings(project_path: &Path) -> Settings {
    let mut settings = read_settings_file(project_path);
    apply_env_overrides(&mut settings);
    settings
}

fn read_settings_file(project_path: &Path) -> Settings {
    let config_path = rxdesk_dir(project_path).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR) {
        let base_url = base_url.trim();
        if !base_url.is_empty() {
            debug!("{} overrides base_url with {}", BASE_URL_ENV_VAR, base_url);
            settings.api.base_url = base_url.to_string();
        }
    }
}

/// Create default config file in .rxdesk/ directory
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let dir = rxdesk_dir(project_path);

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# rxdesk configuration

[api]
base_url = "http://127.0.0.1:8000/"   # Overridden by RXDESK_BASE_URL
connect_timeout_secs = 10
request_timeout_secs = 30             # Expiry is reported as a network failure
page_size = 100

[fallback]
enabled = true          # Show demo orders/appointments when the backend is unreachable
"#;
        std::fs::write(&config_path, default_content).context("Failed to write config.toml")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_missing_config_uses_defaults() {
        std::env::remove_var(BASE_URL_ENV_VAR);
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());
        assert_eq!(settings.api.base_url, "http://127.0.0.1:8000/");
        assert!(settings.fallback.enabled);
    }

    #[test]
    #[serial]
    fn test_loads_config_file() {
        std::env::remove_var(BASE_URL_ENV_VAR);
        let temp = tempdir().unwrap();
        let dir = temp.path().join(".rxdesk");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[api]\nbase_url = \"http://192.168.0.3:8000/\"\npage_size = 20\n\n[fallback]\nenabled = false\n",
        )
        .unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.api.base_url, "http://192.168.0.3:8000/");
        assert_eq!(settings.api.page_size, 20);
        assert!(!settings.fallback.enabled);
    }

    #[test]
    #[serial]
    fn test_invalid_config_falls_back_to_defaults() {
        std::env::remove_var(BASE_URL_ENV_VAR);
        let temp = tempdir().unwrap();
        let dir = temp.path().join(".rxdesk");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[api\nbase_url = ").unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.api.page_size, 100);
    }

    #[test]
    #[serial]
    fn test_env_overrides_base_url() {
        let temp = tempdir().unwrap();
        std::env::set_var(BASE_URL_ENV_VAR, "http://10.0.2.2:8000/");
        let settings = load_settings(temp.path());
        std::env::remove_var(BASE_URL_ENV_VAR);
        assert_eq!(settings.api.base_url, "http://10.0.2.2:8000/");
    }

    #[test]
    #[serial]
    fn test_blank_env_is_ignored() {
        let temp = tempdir().unwrap();
        std::env::set_var(BASE_URL_ENV_VAR, "  ");
        let settings = load_settings(temp.path());
        std::env::remove_var(BASE_URL_ENV_VAR);
        assert_eq!(settings.api.base_url, "http://127.0.0.1:8000/");
    }

    #[test]
    #[serial]
    fn test_init_config_dir_writes_parseable_defaults() {
        std::env::remove_var(BASE_URL_ENV_VAR);
        let temp = tempdir().unwrap();
        init_config_dir(temp.path()).unwrap();
        assert!(temp.path().join(".rxdesk/config.toml").exists());

        let settings = load_settings(temp.path());
        assert_eq!(settings.api.request_timeout_secs, 30);

        // Idempotent: existing file is left alone
        init_config_dir(temp.path()).unwrap();
    }
}
