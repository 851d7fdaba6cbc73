//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Account and token settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Answer-suggestion endpoint.
    #[serde(default)]
    pub suggester: SuggesterSettings,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "askline_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Passphrase the token key is derived from. Empty means a random key
    /// per process, so tokens do not survive a restart.
    #[serde(default)]
    pub token_secret: String,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Whether newly registered accounts are admins.
    #[serde(default = "default_signup_grants_admin")]
    pub signup_grants_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggesterSettings {
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Empty disables remote calls; every request gets the fallback set.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_num_suggestions")]
    pub num_suggestions: usize,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "askline.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_ttl_secs() -> u64 {
    30 * 60
}

fn default_signup_grants_admin() -> bool {
    true
}

fn default_llm_api_url() -> String {
    askline_suggest::DEFAULT_API_URL.to_string()
}

fn default_llm_model() -> String {
    askline_suggest::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_llm_timeout_secs() -> u64 {
    20
}

fn default_num_suggestions() -> usize {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            signup_grants_admin: default_signup_grants_admin(),
        }
    }
}

impl Default for SuggesterSettings {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            num_suggestions: default_num_suggestions(),
        }
    }
}

impl SuggesterSettings {
    pub fn to_suggester_config(&self) -> askline_suggest::SuggesterConfig {
        askline_suggest::SuggesterConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
            num_suggestions: self.num_suggestions,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ASKLINE_HOST` overrides `server.host`
/// - `ASKLINE_PORT` overrides `server.port`
/// - `ASKLINE_DB_PATH` overrides `database.path`
/// - `ASKLINE_LOG_LEVEL` overrides `logging.level`
/// - `ASKLINE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `ASKLINE_TOKEN_SECRET` overrides `auth.token_secret`
/// - `ASKLINE_LLM_API_KEY`, `ASKLINE_LLM_API_URL`, `ASKLINE_LLM_MODEL`
///   override the matching `suggester` fields
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("ASKLINE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("ASKLINE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("ASKLINE_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("ASKLINE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ASKLINE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(secret) = var("ASKLINE_TOKEN_SECRET") {
        config.auth.token_secret = secret;
    }
    if let Some(key) = var("ASKLINE_LLM_API_KEY") {
        config.suggester.api_key = key;
    }
    if let Some(url) = var("ASKLINE_LLM_API_URL") {
        config.suggester.api_url = url;
    }
    if let Some(model) = var("ASKLINE_LLM_MODEL") {
        config.suggester.model = model;
    }
}
