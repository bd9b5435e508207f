//! Registry configuration from environment variables and an optional TOML file.
//!
//! Invalid environment values fall back to defaults without failing. A config
//! file is only read when `MODEL_REGISTRY_CONFIG` names one, and a file that
//! cannot be read or parsed is an error.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `MODEL_REGISTRY_ROOT` | `/models` | Registry root directory |
//! | `MODEL_REGISTRY_NOTIFY_COMMAND` | unset | Executable run after a switch |
//! | `MODEL_REGISTRY_NOTIFY_TIMEOUT_SECS` | 30 | Kill the notify command after this long |
//! | `MODEL_REGISTRY_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `MODEL_REGISTRY_LOG_LEVEL` | `info` | Log filter directive |
//! | `MODEL_REGISTRY_LOG_FILE` | unset | Append logs here instead of stderr |
//! | `MODEL_REGISTRY_CONFIG` | unset | TOML file with `[registry]` and `[logging]` |
//!
//! Precedence: environment, then file, then defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DEFAULT_NOTIFY_TIMEOUT;
use crate::telemetry::{LogConfig, LogFormat};

pub const ENV_ROOT: &str = "MODEL_REGISTRY_ROOT";
pub const ENV_NOTIFY_COMMAND: &str = "MODEL_REGISTRY_NOTIFY_COMMAND";
pub const ENV_NOTIFY_TIMEOUT: &str = "MODEL_REGISTRY_NOTIFY_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "MODEL_REGISTRY_LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "MODEL_REGISTRY_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "MODEL_REGISTRY_LOG_FILE";
pub const ENV_CONFIG_FILE: &str = "MODEL_REGISTRY_CONFIG";

pub const DEFAULT_ROOT: &str = "/models";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Effective configuration summary, printed by `config show`.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub root: String,
    pub notify_command: Option<String>,
    pub notify_timeout_secs: u64,
    pub log_format: String,
    pub log_level: String,
    pub log_file: Option<String>,
    pub config_file: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub root: PathBuf,
    pub notify_command: Option<PathBuf>,
    pub notify_timeout: Duration,
    pub log: LogConfig,
    /// File the values were layered over, if any.
    pub config_file: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            notify_command: None,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            log: LogConfig::default(),
            config_file: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    registry: RegistrySection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistrySection {
    root: Option<PathBuf>,
    notify_command: Option<PathBuf>,
    notify_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    format: Option<LogFormat>,
    level: Option<String>,
    file: Option<PathBuf>,
}

/// Non-empty env var value, trimmed.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match env_value(key) {
        Some(val) => val.parse::<u64>().unwrap_or(default),
        None => default,
    }
}

fn parse_log_format(key: &str, default: LogFormat) -> LogFormat {
    match env_value(key) {
        Some(val) => val.parse().unwrap_or(default),
        None => default,
    }
}

/// Parse a TOML config file into a layer over the defaults.
pub fn load_file(path: &Path) -> Result<EnvConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let file: FileConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;

    let defaults = EnvConfig::default();
    Ok(EnvConfig {
        root: file.registry.root.unwrap_or(defaults.root),
        notify_command: file.registry.notify_command,
        notify_timeout: file
            .registry
            .notify_timeout_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(defaults.notify_timeout),
        log: LogConfig {
            format: file.logging.format.unwrap_or(defaults.log.format),
            level: file.logging.level.unwrap_or(defaults.log.level),
            output_path: file.logging.file,
        },
        config_file: Some(path.to_path_buf()),
    })
}

/// Load configuration: defaults, then the config file if named, then env.
pub fn load() -> Result<EnvConfig, ConfigError> {
    let base = match env_value(ENV_CONFIG_FILE) {
        Some(path) => load_file(Path::new(&path))?,
        None => EnvConfig::default(),
    };

    Ok(EnvConfig {
        root: env_value(ENV_ROOT).map(PathBuf::from).unwrap_or(base.root),
        notify_command: env_value(ENV_NOTIFY_COMMAND)
            .map(PathBuf::from)
            .or(base.notify_command),
        notify_timeout: Duration::from_secs(
            parse_u64(ENV_NOTIFY_TIMEOUT, base.notify_timeout.as_secs()).max(1),
        ),
        log: LogConfig {
            format: parse_log_format(ENV_LOG_FORMAT, base.log.format),
            level: env_value(ENV_LOG_LEVEL).unwrap_or(base.log.level),
            output_path: env_value(ENV_LOG_FILE).map(PathBuf::from).or(base.log.output_path),
        },
        config_file: base.config_file,
    })
}

impl EnvConfig {
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            root: self.root.display().to_string(),
            notify_command: self.notify_command.as_ref().map(|p| p.display().to_string()),
            notify_timeout_secs: self.notify_timeout.as_secs(),
            log_format: self.log.format.as_str().to_string(),
            log_level: self.log.level.clone(),
            log_file: self.log.output_path.as_ref().map(|p| p.display().to_string()),
            config_file: self.config_file.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// Reject values that would fail at first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("registry root is empty".into()));
        }
        if self.root.exists() && !self.root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "registry root {} is not a directory",
                self.root.display()
            )));
        }
        self.log.validate().map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
