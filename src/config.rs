//! Sweeper configuration, loaded once at startup from a TOML file.
//!
//! # Example
//!
//! ```toml
//! [gateway]
//! api_key = "${ADYEN_API_KEY}"
//! merchant_account = "ShopECOM"
//! environment = "live"
//! url_prefix = "1797a841fbb37ca7-AdyenDemo"
//!
//! [throttle]
//! batch_size = 100
//! cooldown_secs = 120
//!
//! [schedule]
//! interval_secs = 15778800
//! label = "Every Six Months"
//!
//! [logging]
//! format = "json"
//! filter = "info,token_sweeper=debug"
//! ```

use crate::domain::recurring::Environment;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {}", .1.display(), .0)]
    Io(std::io::Error, PathBuf),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Environment variable not set: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweeperConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SweeperConfig {
    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` references are expanded from the environment first.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: SweeperConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.api_key.expose().trim().is_empty() {
            return Err(ConfigError::Validation("gateway.api_key is empty".into()));
        }
        if self.gateway.merchant_account.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.merchant_account is empty".into(),
            ));
        }
        self.gateway.environment()?;
        if self.scan.page_size == 0 {
            return Err(ConfigError::Validation(
                "scan.page_size must be greater than zero".into(),
            ));
        }
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "schedule.interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Gateway API key. Never printed in full.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Test,
    Live,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub api_key: ApiKey,
    pub merchant_account: String,
    #[serde(default)]
    pub environment: GatewayMode,
    /// Merchant specific prefix of the live endpoint. Required in live mode.
    #[serde(default)]
    pub url_prefix: Option<String>,
    /// Overrides the environment's base URL (proxies, local mocks).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        match self.environment {
            GatewayMode::Test => Ok(Environment::Test),
            GatewayMode::Live => match self.url_prefix.as_deref().map(str::trim) {
                Some(prefix) if !prefix.is_empty() => Ok(Environment::Live {
                    url_prefix: prefix.to_string(),
                }),
                _ => Err(ConfigError::Validation(
                    "gateway.url_prefix is required when environment is \"live\"".into(),
                )),
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_version() -> String {
    "v68".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Work units per batch. 0 disables cooldowns.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl ThrottleConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_cooldown_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            label: default_label(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_interval_secs() -> u64 {
    15_778_800 // six months
}

fn default_label() -> String {
    "Every Six Months".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Byte offset of the `#` opening a TOML comment, ignoring `#` inside strings.
fn comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (pos, c) in line.char_indices() {
        match quote {
            // Basic strings honour backslash escapes, literal strings do not
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return Some(pos),
            None => {}
        }
    }
    None
}

/// Expand `${VAR_NAME}` references. References inside comments are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for (index, line) in input.lines().enumerate() {
        if index > 0 {
            result.push('\n');
        }

        let comment_pos = comment_start(line);
        let mut last_end = 0;

        for cap in ENV_VAR.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };
            if comment_pos.is_some_and(|pos| whole.start() >= pos) {
                continue;
            }

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

            result.push_str(&line[last_end..whole.start()]);
            result.push_str(&value);
            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        result.push('\n');
    }

    Ok(result)
}
