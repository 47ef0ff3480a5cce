//! Configuration system (layered: code > env > config file > defaults).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};

/// Global default config (lazy-initialized from file + env).
static DEFAULT_CONFIG: OnceLock<OrbitConfig> = OnceLock::new();

/// Default cap on tool rounds within one run.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;
/// Default ceiling on the accumulated argument bytes of a single tool call.
pub const DEFAULT_MAX_TOOL_ARGUMENT_BYTES: usize = 1024 * 1024;
/// Default prefix of caller-injected argument keys that bypass reconciliation.
pub const DEFAULT_PASS_THROUGH_PREFIX: &str = "_orbit_";

const CONFIG_PATH_ENV: &str = "ORBIT_CONFIG";
const MAX_TOOL_ROUNDS_ENV: &str = "ORBIT_MAX_TOOL_ROUNDS";
const MAX_TOOL_ARGUMENT_BYTES_ENV: &str = "ORBIT_MAX_TOOL_ARGUMENT_BYTES";
const PASS_THROUGH_PREFIX_ENV: &str = "ORBIT_PASS_THROUGH_PREFIX";
const STRICT_TOOL_SCHEMAS_ENV: &str = "ORBIT_STRICT_TOOL_SCHEMAS";
const ENDPOINT_ENV: &str = "ORBIT_ENDPOINT";
const API_KEY_ENV: &str = "ORBIT_API_KEY";
const CONFIG_FILE_NAME: &str = "orbit.toml";

/// Layered configuration for Orbit.
///
/// Resolution order (later wins):
/// 1. Built-in defaults
/// 2. `orbit.toml` (path from `ORBIT_CONFIG`, else the platform config dir)
/// 3. `ORBIT_*` environment variables (after loading `.env`)
/// 4. Explicit values set in code
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    #[builder(default = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,
    #[builder(default = DEFAULT_MAX_TOOL_ARGUMENT_BYTES)]
    pub max_tool_argument_bytes: usize,
    #[builder(default = DEFAULT_PASS_THROUGH_PREFIX.to_string(), into)]
    pub pass_through_prefix: String,
    #[builder(default)]
    pub strict_tool_schemas: bool,
    #[builder(into)]
    pub endpoint: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_tool_argument_bytes: DEFAULT_MAX_TOOL_ARGUMENT_BYTES,
            pass_through_prefix: DEFAULT_PASS_THROUGH_PREFIX.to_string(),
            strict_tool_schemas: false,
            endpoint: None,
            api_key: None,
        }
    }
}

impl OrbitConfig {
    /// Load from the config file (if any) and then environment variables.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Get (or create) the global default config.
    ///
    /// A malformed config file is logged and replaced by env-only settings.
    pub fn global() -> &'static OrbitConfig {
        DEFAULT_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unreadable orbit config file");
                Self::from_env()
            })
        })
    }

    /// Overlay `ORBIT_*` environment variables. Invalid values are ignored.
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        if let Some(rounds) = env_positive_usize(MAX_TOOL_ROUNDS_ENV) {
            self.max_tool_rounds = rounds;
        }
        if let Some(bytes) = env_positive_usize(MAX_TOOL_ARGUMENT_BYTES_ENV) {
            self.max_tool_argument_bytes = bytes;
        }
        if let Ok(prefix) = std::env::var(PASS_THROUGH_PREFIX_ENV) {
            if !prefix.trim().is_empty() {
                self.pass_through_prefix = prefix;
            }
        }
        if let Ok(strict) = std::env::var(STRICT_TOOL_SCHEMAS_ENV) {
            if let Some(parsed) = parse_bool(&strict) {
                self.strict_tool_schemas = parsed;
            }
        }
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
    }

    /// Reject settings that would make every run fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_tool_argument_bytes == 0 {
            return Err(OrbitError::Configuration(
                "max_tool_argument_bytes must be greater than zero".to_string(),
            ));
        }
        if self.pass_through_prefix.is_empty() {
            return Err(OrbitError::Configuration(
                "pass_through_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Location of `orbit.toml`: `ORBIT_CONFIG`, else the platform config dir.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    directories::ProjectDirs::from("dev", "orbit", "orbit")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn env_positive_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|value| parse_positive_usize(&value))
}

pub(crate) fn parse_positive_usize(value: &str) -> Option<usize> {
    let parsed = value.trim().parse::<usize>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
