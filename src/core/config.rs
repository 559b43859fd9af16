use crate::core::cache::CacheConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";
pub const APP_ID_ENV: &str = "OPEN_EXCHANGE_RATES_APP_ID";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_type() -> String {
    "null".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheSettings {
    /// One of `null`, `memory` or `custom`.
    #[serde(rename = "type", default = "default_cache_type")]
    pub kind: String,
    /// Directory of the on-disk store used by the `custom` adapter.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            kind: default_cache_type(),
            path: None,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        CacheConfig::new(&settings.kind)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Reject conversions that do not name a source currency.
    #[serde(default)]
    pub require_source_currency: bool,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_id: None,
            base_url: default_base_url(),
            cache: CacheSettings::default(),
            require_source_currency: false,
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Defaults with the app id taken from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.fill_from_env();
        config
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "openexchangerates", "oxrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "openexchangerates", "oxrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Directory for the on-disk cache: `cache.path` or `<data_path>/cache`.
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.default_data_path()?.join("cache")),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.fill_from_env();
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn fill_from_env(&mut self) {
        self.app_id = app_id_or_default(self.app_id.take(), std::env::var(APP_ID_ENV).ok());
    }
}

/// The configured app id, or the process-wide default when it is missing or empty.
fn app_id_or_default(configured: Option<String>, default: Option<String>) -> Option<String> {
    configured
        .filter(|id| !id.is_empty())
        .or_else(|| default.filter(|id| !id.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
app_id: "myappid"
cache:
  type: custom
  path: "/tmp/oxrates"
require_source_currency: true
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.app_id.as_deref(), Some("myappid"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache.kind, "custom");
        assert_eq!(config.cache.path.as_deref(), Some("/tmp/oxrates"));
        assert!(config.require_source_currency);
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/tmp/oxrates")
        );

        let yaml_str_minimal = r#"
base_url: "http://example.com/api"
data_path: "/tmp/data"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str_minimal).unwrap();
        assert_eq!(config.base_url, "http://example.com/api");
        assert_eq!(config.cache.kind, "null");
        assert!(!config.require_source_currency);
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/tmp/data").join("cache")
        );
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "app_id: fromfile\ncache:\n  type: memory\n")?;

        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.app_id.as_deref(), Some("fromfile"));
        assert_eq!(CacheConfig::from(&config.cache).kind, "memory");
        Ok(())
    }

    #[test]
    fn test_app_id_default() {
        let configured = Some("fromfile".to_string());
        let env = Some("fromenv".to_string());

        assert_eq!(
            app_id_or_default(configured.clone(), env.clone()).as_deref(),
            Some("fromfile")
        );
        assert_eq!(app_id_or_default(None, env.clone()).as_deref(), Some("fromenv"));
        assert_eq!(
            app_id_or_default(Some(String::new()), env).as_deref(),
            Some("fromenv")
        );
        assert_eq!(
            app_id_or_default(configured, None).as_deref(),
            Some("fromfile")
        );
        assert_eq!(app_id_or_default(None, Some(String::new())), None);
        assert_eq!(app_id_or_default(None, None), None);
    }

    #[test]
    fn test_load_from_path_keeps_explicit_app_id() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "app_id: explicit\n")?;

        // Whatever the environment holds, an id from the file wins.
        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.app_id.as_deref(), Some("explicit"));
        Ok(())
    }

    #[test]
    fn test_load_from_missing_path() {
        let result = AppConfig::load_from_path("/nonexistent/oxrates/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
