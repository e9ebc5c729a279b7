use std::{fs, path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use fluxdone_core::{Category, Clock, Priority, SortMode, SystemClock};
use fluxdone_store_http::{HttpStore, HttpStoreError};
use serde::{Deserialize, Deserializer, de};
use time::UtcOffset;

use crate::input::{parse_sort_mode, parse_utc_offset};

const CONFIG_DIR: &str = ".fluxdone";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `[api] base_url`.
pub const ENV_API_URL: &str = "FLUXDONE_API_URL";
/// Environment variable overriding `[time] utc_offset`.
pub const ENV_UTC_OFFSET: &str = "FLUXDONE_UTC_OFFSET";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

/// Client configuration loaded from `.fluxdone/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FluxConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub time: TimeConfig,
}

/// `[api]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: None,
        }
    }
}

/// `[view]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_list")]
    pub default_list: String,
    #[serde(default, deserialize_with = "sort_mode_from_token")]
    pub default_sort: SortMode,
    #[serde(default)]
    pub default_priority: Priority,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_list: default_list(),
            default_sort: SortMode::default(),
            default_priority: Priority::default(),
        }
    }
}

/// `[time]` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeConfig {
    #[serde(default, deserialize_with = "offset_from_token")]
    pub utc_offset: Option<UtcOffset>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_list() -> String {
    fluxdone_core::category::INBOX.to_owned()
}

fn sort_mode_from_token<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SortMode, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_sort_mode(&raw).map_err(de::Error::custom)
}

fn offset_from_token<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<UtcOffset>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.as_deref()
        .map(parse_utc_offset)
        .transpose()
        .map_err(de::Error::custom)
}

impl FluxConfig {
    /// Load from `workdir` and apply environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an override is
    /// malformed, or the result fails validation.
    pub fn load(workdir: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_workdir(workdir)?;
        config.apply_env_with(&mut |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a known directory without consulting the environment.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed or fails validation.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment variables; blank values are ignored.
    ///
    /// # Errors
    /// Returns an error if the offset override does not parse.
    pub fn apply_env_with(&mut self, fetch: &mut impl FnMut(&'static str) -> Option<String>) -> Result<()> {
        if let Some(url) = env_value_with(ENV_API_URL, fetch) {
            self.api.base_url = url.trim().to_owned();
        }
        if let Some(raw) = env_value_with(ENV_UTC_OFFSET, fetch) {
            let offset = parse_utc_offset(&raw).with_context(|| format!("invalid {ENV_UTC_OFFSET}"))?;
            self.time.utc_offset = Some(offset);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api base_url must not be empty");
        }
        if self.api.timeout_secs == Some(0) {
            bail!("api timeout_secs must be greater than zero");
        }
        let list = self.view.default_list.trim();
        if list.is_empty() {
            bail!("default list must not be empty");
        }
        if Category::from(list).is_virtual() {
            bail!("default list '{list}' is a computed category, not a list");
        }
        Ok(())
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Clock honoring the configured offset, or the system's local one.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        let clock = self
            .time
            .utc_offset
            .map_or_else(SystemClock::local, SystemClock::with_offset);
        Arc::new(clock)
    }

    /// HTTP gateway pointed at the configured API.
    ///
    /// # Errors
    /// Returns an error if the base URL is not a valid URL.
    pub fn http_store(&self) -> Result<HttpStore, HttpStoreError> {
        HttpStore::with_timeout(&self.api.base_url, self.timeout())
    }
}

fn env_value_with(
    key: &'static str,
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Option<String> {
    fetch(key).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use time::macros::offset;

    fn write_config(dir: &Path, contents: &str) -> Result<()> {
        let cfg_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&cfg_dir)?;
        let mut file = fs::File::create(cfg_dir.join(CONFIG_FILE))?;
        writeln!(file, "{contents}")?;
        Ok(())
    }

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = FluxConfig::from_workdir(dir.path())?;
        assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
        assert!(cfg.timeout().is_none());
        assert_eq!(cfg.view.default_list, "inbox");
        assert_eq!(cfg.view.default_sort, SortMode::Custom);
        assert_eq!(cfg.view.default_priority, Priority::None);
        assert!(cfg.time.utc_offset.is_none());
        Ok(())
    }

    #[test]
    fn load_config_with_all_sections() -> Result<()> {
        let dir = tempdir()?;
        write_config(
            dir.path(),
            "[api]\nbase_url = \"https://todo.example.invalid/api\"\ntimeout_secs = 5\n\n[view]\ndefault_list = \"work\"\ndefault_sort = \"due-date\"\ndefault_priority = 2\n\n[time]\nutc_offset = \"+09:00\"",
        )?;

        let cfg = FluxConfig::from_workdir(dir.path())?;
        assert_eq!(cfg.api.base_url, "https://todo.example.invalid/api");
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.view.default_list, "work");
        assert_eq!(cfg.view.default_sort, SortMode::DueDate);
        assert_eq!(cfg.view.default_priority, Priority::Medium);
        assert_eq!(cfg.time.utc_offset, Some(offset!(+9)));
        assert_eq!(cfg.clock().now().offset(), offset!(+9));
        Ok(())
    }

    #[test]
    fn virtual_default_list_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[view]\ndefault_list = \"today\"")?;

        let Err(err) = FluxConfig::from_workdir(dir.path()) else {
            panic!("computed default list should error");
        };
        assert!(err.to_string().contains("computed category"));
        Ok(())
    }

    #[test]
    fn malformed_values_fail_to_parse() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[view]\ndefault_sort = \"random\"")?;
        assert!(FluxConfig::from_workdir(dir.path()).is_err());

        write_config(dir.path(), "[view]\ndefault_priority = 7")?;
        assert!(FluxConfig::from_workdir(dir.path()).is_err());

        write_config(dir.path(), "[api]\ntimeout_secs = 0")?;
        let Err(err) = FluxConfig::from_workdir(dir.path()) else {
            panic!("zero timeout should error");
        };
        assert!(err.to_string().contains("timeout_secs"));
        Ok(())
    }

    #[test]
    fn environment_overrides_file_values() -> Result<()> {
        let mut cfg = FluxConfig::default();
        let mut fetch = |key: &'static str| match key {
            ENV_API_URL => Some(" http://localhost:9000/api ".into()),
            ENV_UTC_OFFSET => Some("-03:00".into()),
            _ => None,
        };
        cfg.apply_env_with(&mut fetch)?;
        assert_eq!(cfg.api.base_url, "http://localhost:9000/api");
        assert_eq!(cfg.time.utc_offset, Some(offset!(-3)));
        Ok(())
    }

    #[test]
    fn blank_environment_values_are_ignored() -> Result<()> {
        let mut cfg = FluxConfig::default();
        let mut fetch = |_: &'static str| Some("   ".to_owned());
        cfg.apply_env_with(&mut fetch)?;
        assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
        assert!(cfg.time.utc_offset.is_none());

        let mut fetch = |key: &'static str| (key == ENV_UTC_OFFSET).then(|| "soon".to_owned());
        assert!(cfg.apply_env_with(&mut fetch).is_err());
        Ok(())
    }

    #[test]
    fn http_store_uses_configured_url() -> Result<()> {
        let cfg = FluxConfig::default();
        let store = cfg.http_store()?;
        assert_eq!(store.base_url(), DEFAULT_API_URL);
        Ok(())
    }
}
