//! Runtime configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/tally.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Values missing from the override keep their built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::DEFAULT_MONTHLY_TARGET;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

/// Settings for oracle calls
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    /// Model used when the environment does not name one
    pub model: String,
    /// Upper bound for a single oracle call
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: "gemma3".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.1,
            max_tokens: 500,
        }
    }
}

/// Budget defaults
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConfig {
    pub default_monthly_target: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            default_monthly_target: DEFAULT_MONTHLY_TARGET,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub oracle: OracleConfig,
    pub budget: BudgetConfig,
}

impl Config {
    /// Load from the default override location, or the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from a specific override file (embedded defaults if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("tally.toml"))
}

fn load_config(override_path: Option<&Path>) -> Result<Config> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    oracle: Option<RawOracle>,
    budget: Option<RawBudget>,
}

#[derive(Debug, Deserialize)]
struct RawOracle {
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    default_monthly_target: Option<f64>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(oracle) = raw.oracle {
        if let Some(model) = oracle.model {
            config.oracle.model = model;
        }
        if let Some(secs) = oracle.timeout_secs {
            if secs == 0 {
                return Err(Error::InvalidData(
                    "oracle.timeout_secs must be greater than zero".to_string(),
                ));
            }
            config.oracle.timeout = Duration::from_secs(secs);
        }
        if let Some(temperature) = oracle.temperature {
            config.oracle.temperature = temperature;
        }
        if let Some(max_tokens) = oracle.max_tokens {
            config.oracle.max_tokens = max_tokens;
        }
    }

    if let Some(budget) = raw.budget {
        if let Some(target) = budget.default_monthly_target {
            config.budget.default_monthly_target = crate::models::validate_target(target)?;
        }
    }

    Ok(config)
}
