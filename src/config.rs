use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_production_url")]
    pub production_url: String,
    #[serde(default = "default_development_url")]
    pub development_url: String,
    /// No timeout unless set.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_dashboard_interval")]
    pub dashboard_interval_secs: u64,
    #[serde(default = "default_markets_interval")]
    pub markets_interval_secs: u64,
    #[serde(default = "default_market_detail_interval")]
    pub market_detail_interval_secs: u64,
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Keep the token in memory only (lost on exit).
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_ms: u64,
    #[serde(default)]
    pub start_route: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_path")]
    pub path: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_production_url() -> String { "http://3.65.249.159:8001".to_string() }
fn default_development_url() -> String { "http://localhost:8001".to_string() }
fn default_dashboard_interval() -> u64 { 30 }
fn default_markets_interval() -> u64 { 60 }
fn default_market_detail_interval() -> u64 { 30 }
fn default_health_interval() -> u64 { 30 }
fn default_storage_path() -> String { "polybot-dashboard.db".to_string() }
fn default_token_key() -> String { "token".to_string() }
fn default_base_path() -> String { "/polybot".to_string() }
fn default_rows_per_page() -> usize { 10 }
fn default_tick_rate() -> u64 { 100 }
fn default_notification_ttl() -> u64 { 6000 }
fn default_log_path() -> String { "polybot-dashboard.log".to_string() }
fn default_log_filter() -> String { "info".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            production_url: default_production_url(),
            development_url: default_development_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            dashboard_interval_secs: default_dashboard_interval(),
            markets_interval_secs: default_markets_interval(),
            market_detail_interval_secs: default_market_detail_interval(),
            health_interval_secs: default_health_interval(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            token_key: default_token_key(),
            in_memory: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            rows_per_page: default_rows_per_page(),
            tick_rate_ms: default_tick_rate(),
            notification_ttl_ms: default_notification_ttl(),
            start_route: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            filter: default_log_filter(),
        }
    }
}

impl PollingConfig {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_secs)
    }

    pub fn markets_interval(&self) -> Duration {
        Duration::from_secs(self.markets_interval_secs)
    }

    pub fn market_detail_interval(&self) -> Duration {
        Duration::from_secs(self.market_detail_interval_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub environment: Environment,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub storage_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Missing file falls back to defaults; a malformed one is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve the API base URL: explicit env override first, then by environment.
    pub fn api_base_url(&self, env: &EnvConfig) -> String {
        if let Some(url) = &env.api_url {
            return url.trim_end_matches('/').to_string();
        }
        let url = match env.environment {
            Environment::Production => &self.api.production_url,
            Environment::Development => &self.api.development_url,
        };
        url.trim_end_matches('/').to_string()
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let environment = match std::env::var("POLYBOT_ENV") {
            Ok(value) => parse_environment(&value)
                .with_context(|| format!("POLYBOT_ENV has unknown value: {}", value))?,
            Err(_) => Environment::Development,
        };

        Ok(Self {
            environment,
            api_url: std::env::var("POLYBOT_API_URL").ok().filter(|s| !s.is_empty()),
            api_token: std::env::var("POLYBOT_API_TOKEN").ok().filter(|s| !s.is_empty()),
            storage_path: std::env::var("POLYBOT_STORAGE_PATH").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn parse_environment(value: &str) -> Option<Environment> {
    match value.trim().to_lowercase().as_str() {
        "production" | "prod" => Some(Environment::Production),
        "development" | "dev" => Some(Environment::Development),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(environment: Environment, api_url: Option<&str>) -> EnvConfig {
        EnvConfig {
            environment,
            api_url: api_url.map(str::to_string),
            api_token: None,
            storage_path: None,
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.polling.dashboard_interval(), Duration::from_secs(30));
        assert_eq!(config.polling.markets_interval(), Duration::from_secs(60));
        assert_eq!(config.polling.market_detail_interval(), Duration::from_secs(30));
        assert_eq!(config.storage.token_key, "token");
        assert_eq!(config.ui.base_path, "/polybot");
        assert_eq!(config.ui.rows_per_page, 10);
        assert!(config.api.request_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [polling]
            markets_interval_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.polling.markets_interval_secs, 120);
        assert_eq!(config.polling.dashboard_interval_secs, 30);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = Config::parse(include_str!("../config.toml")).unwrap();
        assert_eq!(config.ui.notification_ttl_ms, 6000);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.storage.in_memory);
    }

    #[test]
    fn test_request_timeout_is_opt_in() {
        let config = Config::parse(
            r#"
            [api]
            request_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.api.request_timeout_secs, Some(30));
        assert_eq!(config.api.development_url, "http://localhost:8001");
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(Config::parse("[polling\nfoo = ").is_err());
    }

    #[test]
    fn test_api_base_url_by_environment() {
        let config = Config::default();

        assert_eq!(
            config.api_base_url(&env(Environment::Development, None)),
            "http://localhost:8001"
        );
        assert_eq!(
            config.api_base_url(&env(Environment::Production, None)),
            "http://3.65.249.159:8001"
        );
        assert_eq!(
            config.api_base_url(&env(Environment::Production, Some("http://bot.local:9000/"))),
            "http://bot.local:9000"
        );
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!(parse_environment("PRODUCTION"), Some(Environment::Production));
        assert_eq!(parse_environment("dev"), Some(Environment::Development));
        assert_eq!(parse_environment("staging"), None);
    }
}
