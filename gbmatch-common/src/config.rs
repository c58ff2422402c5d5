//! Configuration loading and config file resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "GBMATCH_CONFIG";

pub const DEFAULT_INATURALIST_URL: &str = "https://api.inaturalist.org/v1";
pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_TOOL_NAME: &str = "gbmatch";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

/// Top-level TOML configuration
///
/// Every section is optional; missing values fall back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub inaturalist: INaturalistConfig,
    pub ncbi: NcbiConfig,
    pub http: HttpConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    /// Path to the exception table (TOML)
    pub exceptions_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct INaturalistConfig {
    pub base_url: String,
}

impl Default for INaturalistConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INATURALIST_URL.to_string(),
        }
    }
}

/// NCBI E-utilities settings
///
/// NCBI asks clients to identify themselves with `tool` and `email`; an API
/// key raises the server-side quota but the local one-call-per-second gate
/// still applies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NcbiConfig {
    pub base_url: String,
    pub tool: String,
    pub email: Option<String>,
    pub api_key: Option<String>,
}

impl Default for NcbiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EUTILS_URL.to_string(),
            tool: DEFAULT_TOOL_NAME.to_string(),
            email: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("gbmatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum spacing between any two external calls
    pub min_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl RateLimitConfig {
    /// Configured spacing, never below one call per second
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.max(DEFAULT_MIN_INTERVAL_MS))
    }

    fn validate(&self) -> Result<()> {
        if self.min_interval_ms < DEFAULT_MIN_INTERVAL_MS {
            return Err(Error::Config(format!(
                "rate_limit.min_interval_ms must be at least {}, got {}",
                DEFAULT_MIN_INTERVAL_MS, self.min_interval_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Either a bare level (`debug`) applied to the gbmatch crates, or a
    /// full filter directive (`gbmatch=debug,reqwest=warn`). RUST_LOG wins.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Tracing filter directive; quiet mode keeps errors only
    pub fn filter_directive(&self, quiet: bool) -> String {
        let level = if quiet { "error" } else { self.level.trim() };
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("gbmatch={0},gbmatch_common={0}", level)
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.rate_limit.validate()?;
        Ok(config)
    }

    /// Read configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// Config file resolution, in priority order:
/// 1. Command-line argument (must exist)
/// 2. Environment variable (must exist)
/// 3. `<config dir>/gbmatch/config.toml`, if present
///
/// `Ok(None)` means no file applies and compiled defaults are used.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_existing(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return require_existing(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let default_path = default_config_path();
    match default_path {
        Some(path) if path.exists() => Ok(Some(path)),
        _ => {
            debug!("No config file found, using defaults");
            Ok(None)
        }
    }
}

/// Load the resolved config file, or defaults when none applies
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg, CONFIG_ENV_VAR)? {
        Some(path) => TomlConfig::load(&path),
        None => Ok(TomlConfig::default()),
    }
}

/// `~/.config/gbmatch/config.toml` on Linux, platform equivalents elsewhere
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gbmatch").join("config.toml"))
}

fn require_existing(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}
