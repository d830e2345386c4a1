use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use core_types::Language;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const BACKEND_URL_ENV: &str = "BATAS_BACKEND_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AppConfig {
    pub schema_version: u32,
    /// Initial UI language. Runtime toggles are not written back.
    pub language: Language,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            language: Language::En,
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn apply_env_overrides(&mut self) {
        self.apply_backend_override(std::env::var(BACKEND_URL_ENV).ok());
    }

    fn apply_backend_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            info!(base_url = %url, "backend url overridden from {BACKEND_URL_ENV}");
            self.api.base_url = url;
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push("batas");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        if self.migrate(&mut config) {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );

        if config.api.base_url.trim().is_empty() {
            config.api.base_url = DEFAULT_BASE_URL.to_string();
        }
        if config.api.timeout_ms == 0 {
            config.api.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.language, Language::En);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(store.path().exists());
    }

    #[test]
    fn migrates_legacy_schema_and_fills_blank_api() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"schema_version": 0, "language": "tl", "api": {"base_url": "", "timeout_ms": 0}}"#,
        )
        .expect("write legacy");

        let config = store.load_or_init().expect("load legacy");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.language, Language::Tl);
        assert_eq!(config.api, ApiConfig::default());

        let reloaded = store.load_or_init().expect("reload");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn missing_api_section_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"schema_version": 1, "language": "en"}"#).expect("parse");
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn backend_override_ignores_blank_values() {
        let mut config = AppConfig::default();
        config.apply_backend_override(Some("   ".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        config.apply_backend_override(Some("https://batas.example".to_string()));
        assert_eq!(config.api.base_url, "https://batas.example");
    }
}
