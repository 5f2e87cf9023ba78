use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TempolensError};

pub const DEFAULT_TEMPO_URL: &str = "http://localhost:3200";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub tempo_url: String,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tempo_url: DEFAULT_TEMPO_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Config {
    /// Defaults, then the config file (if any), then the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    /// Applies command line values on top of whatever was loaded.
    pub fn with_cli_overrides(
        mut self,
        tempo_url: Option<String>,
        fetch_timeout: Option<String>,
    ) -> Result<Self> {
        let overrides = ConfigOverrides {
            tempo_url,
            fetch_timeout,
        };
        apply_overrides(&mut self, overrides, "command line")?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    tempo_url: Option<String>,
    fetch_timeout: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TEMPOLENS_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("tempolens/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path).map_err(|e| {
        TempolensError::Config(format!("failed reading {}: {e}", path.display()))
    })?;
    let parsed: ConfigOverrides = toml::from_str(&raw).map_err(|e| {
        TempolensError::Config(format!("failed parsing {}: {e}", path.display()))
    })?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        tempo_url: env::var("TEMPO_URL").ok().filter(|v| !v.is_empty()),
        fetch_timeout: env::var("TEMPOLENS_FETCH_TIMEOUT").ok(),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.tempo_url {
        let trimmed = v.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(TempolensError::Config(format!(
                "empty tempo_url in {source}"
            )));
        }
        cfg.tempo_url = trimmed.to_string();
    }
    if let Some(v) = overrides.fetch_timeout {
        let timeout = humantime::parse_duration(v.trim()).map_err(|e| {
            TempolensError::Config(format!("bad fetch_timeout in {source}: {e} (value={v})"))
        })?;
        if timeout.is_zero() {
            return Err(TempolensError::Config(format!(
                "fetch_timeout in {source} must be positive"
            )));
        }
        cfg.fetch_timeout = timeout;
    }
    Ok(())
}
