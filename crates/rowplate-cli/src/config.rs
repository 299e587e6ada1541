//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables (`ROWPLATE_*`, after `.env` is loaded)
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rowplate_core::application::services::http_sender::DEFAULT_PACING;
use rowplate_core::domain::{CellDelimiter, Encoding};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP sender settings.
    pub http: HttpConfig,
    /// File builder and CSV settings.
    pub generate: GenerateConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub pacing_ms: u64,
    /// Overrides every template's wait timeout when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pacing_ms: DEFAULT_PACING.as_millis() as u64,
            timeout_secs: None,
            insecure: false,
            proxy: None,
        }
    }
}

impl HttpConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Overrides every line template's encoding when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    pub cell_delimiter: CellDelimiter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `config_file` must exist; the default locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::load_file(path)?,
            None => match Self::active_path() {
                Some(path) => Self::load_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse one config file without environment overrides.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = toml::to_string_pretty(self).context("failed to serialise config")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create config directory '{}'", parent.display())
                })?;
            }
        }
        std::fs::write(path, text)
            .with_context(|| format!("failed to write config '{}'", path.display()))
    }

    /// Apply `ROWPLATE_*` overrides read through `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        for key in Self::KEYS {
            let var = format!("ROWPLATE_{}", key.replace('.', "_").to_ascii_uppercase());
            if let Some(value) = lookup(&var) {
                self.set(key, &value)
                    .with_context(|| format!("invalid value in {var}"))?;
            }
        }
        Ok(())
    }

    /// Every settable dotted key.
    pub const KEYS: [&'static str; 8] = [
        "http.pacing_ms",
        "http.timeout_secs",
        "http.insecure",
        "http.proxy",
        "generate.encoding",
        "generate.cell_delimiter",
        "output.no_color",
        "output.format",
    ];

    /// Current value of a dotted key.
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let value = match key {
            "http.pacing_ms" => self.http.pacing_ms.to_string(),
            "http.timeout_secs" => opt(self.http.timeout_secs),
            "http.insecure" => self.http.insecure.to_string(),
            "http.proxy" => self.http.proxy.clone().unwrap_or_default(),
            "generate.encoding" => opt(self.generate.encoding),
            "generate.cell_delimiter" => self.generate.cell_delimiter.to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.clone(),
            _ => anyhow::bail!("unknown config key '{key}'"),
        };
        Ok(value)
    }

    /// Parse and store `value` under a dotted key. An empty value clears
    /// optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            "http.pacing_ms" => self.http.pacing_ms = value.parse()?,
            "http.timeout_secs" => {
                self.http.timeout_secs =
                    non_empty(value).map(|v| v.parse::<u64>()).transpose()?;
            }
            "http.insecure" => self.http.insecure = value.parse()?,
            "http.proxy" => self.http.proxy = non_empty(value).map(String::from),
            "generate.encoding" => {
                self.generate.encoding =
                    non_empty(value).map(|v| v.parse::<Encoding>()).transpose()?;
            }
            "generate.cell_delimiter" => self.generate.cell_delimiter = value.parse()?,
            "output.no_color" => self.output.no_color = value.parse()?,
            "output.format" => self.output.format = value.to_string(),
            _ => anyhow::bail!("unknown config key '{key}'"),
        }
        Ok(())
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.rowplate.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("io", "rowplate", "rowplate")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(Self::LOCAL_FILE))
    }

    pub const LOCAL_FILE: &'static str = ".rowplate.toml";

    /// Existing config file: `./.rowplate.toml` first, then [`Self::config_path`].
    pub fn active_path() -> Option<PathBuf> {
        [PathBuf::from(Self::LOCAL_FILE), Self::config_path()]
            .into_iter()
            .find(|p| p.is_file())
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.http.pacing(), Duration::from_millis(200));
        assert_eq!(cfg.generate.cell_delimiter, CellDelimiter::Any);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\npacing_ms = 50\n").unwrap();

        let cfg = AppConfig::load_file(&path).unwrap();
        assert_eq!(cfg.http.pacing_ms, 50);
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some(&PathBuf::from("/no/such/rowplate.toml"))).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env = HashMap::from([
            ("ROWPLATE_HTTP_PACING_MS", "0"),
            ("ROWPLATE_GENERATE_ENCODING", "UTF-16LE"),
            ("ROWPLATE_HTTP_PROXY", "http://proxy:3128"),
        ]);
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.http.pacing_ms, 0);
        assert_eq!(cfg.generate.encoding, Some(Encoding::Utf16Le));
        assert_eq!(cfg.http.proxy.as_deref(), Some("http://proxy:3128"));
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut cfg = AppConfig::default();
        let err = cfg
            .apply_env(|k| (k == "ROWPLATE_HTTP_INSECURE").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ROWPLATE_HTTP_INSECURE"));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut cfg = AppConfig::default();
        cfg.set("http.timeout_secs", "9").unwrap();
        assert_eq!(cfg.get("http.timeout_secs").unwrap(), "9");
        cfg.set("http.timeout_secs", "").unwrap();
        assert_eq!(cfg.http.timeout_secs, None);
        assert!(cfg.set("nope", "1").is_err());
        assert!(cfg.get("nope").is_err());
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = AppConfig::default();
        cfg.set("generate.cell_delimiter", "semicolon").unwrap();
        cfg.save(&path).unwrap();
        assert_eq!(AppConfig::load_file(&path).unwrap(), cfg);
    }
}
