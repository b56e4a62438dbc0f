use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.revenuecat.com/v2";
pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub revenuecat: RevenueCatConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueCatConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    5_000
}

impl Default for RevenueCatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            base_url: default_base_url(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            initial_delay_ms: default_retry_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Config {
    /// Loads `$CONFIG_PATH` (default `config.toml`) and applies environment overrides.
    /// A missing file is fine; everything can come from the environment.
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_path(Path::new(&config_path), |name| env::var(name).ok())
    }

    pub fn from_path<F>(config_path: &Path, get_env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        use std::io::ErrorKind;

        let file = match std::fs::read_to_string(config_path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!(
                    "No config file at {}, using environment only",
                    config_path.display()
                );
                None
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Cannot read config file {}: {e}",
                    config_path.display()
                )));
            }
        };

        Self::from_sources(file.as_deref(), get_env)
    }

    /// Builds a config from optional TOML text and an environment lookup.
    pub fn from_sources<F>(file: Option<&str>, get_env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = match file {
            Some(contents) => toml::from_str(contents)
                .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {e}")))?,
            None => Config::default(),
        };

        fn parse_into<T: std::str::FromStr>(value: Option<String>, target: &mut T) {
            if let Some(v) = value
                && let Ok(parsed) = v.trim().parse()
            {
                *target = parsed;
            }
        }

        if let Some(v) = get_env("REVENUECAT_API_KEY") {
            config.revenuecat.api_key = v;
        }
        if let Some(v) = get_env("REVENUECAT_PROJECT_ID") {
            config.revenuecat.project_id = v;
        }
        if let Some(v) = get_env("REVENUECAT_BASE_URL") {
            config.revenuecat.base_url = v;
        }
        parse_into(get_env("REVENUECAT_PAGE_LIMIT"), &mut config.revenuecat.page_limit);
        parse_into(get_env("REVENUECAT_TIMEOUT_SECS"), &mut config.revenuecat.timeout_secs);
        parse_into(get_env("REVENUECAT_RETRY_ATTEMPTS"), &mut config.retry.attempts);
        parse_into(get_env("REVENUECAT_RETRY_DELAY_MS"), &mut config.retry.initial_delay_ms);

        Ok(config)
    }

    /// Checks the credentials before any request is made.
    pub fn validate(&self) -> AppResult<()> {
        if self.revenuecat.api_key.trim().is_empty() || self.revenuecat.project_id.trim().is_empty()
        {
            return Err(AppError::ConfigError(
                "Please set REVENUECAT_API_KEY and REVENUECAT_PROJECT_ID in your .env file or environment"
                    .to_string(),
            ));
        }
        if self.revenuecat.base_url.trim().is_empty() {
            return Err(AppError::ConfigError("REVENUECAT_BASE_URL must not be empty".into()));
        }
        if self.retry.attempts == 0 {
            return Err(AppError::ConfigError("retry.attempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn page_limit(&self) -> u32 {
        self.revenuecat.page_limit.clamp(1, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::from_sources(None, env_of(&[])).unwrap();
        assert_eq!(config.revenuecat.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_limit(), 100);
        assert_eq!(config.revenuecat.timeout_secs, 30);
        assert_eq!(config.retry.attempts, 3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = r#"
            [revenuecat]
            api_key = "sk_file"
            project_id = "proj_file"
            page_limit = 50

            [retry]
            attempts = 5
        "#;
        let config = Config::from_sources(
            Some(file),
            env_of(&[
                ("REVENUECAT_API_KEY", "sk_env"),
                ("REVENUECAT_PAGE_LIMIT", "20"),
                ("REVENUECAT_TIMEOUT_SECS", "not-a-number"),
            ]),
        )
        .unwrap();

        assert_eq!(config.revenuecat.api_key, "sk_env");
        assert_eq!(config.revenuecat.project_id, "proj_file");
        assert_eq!(config.page_limit(), 20);
        assert_eq!(config.revenuecat.timeout_secs, 30);
        assert_eq!(config.retry.attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config =
            Config::from_sources(None, env_of(&[("REVENUECAT_API_KEY", "sk_1")])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("REVENUECAT_PROJECT_ID"));

        let blank = Config::from_sources(
            None,
            env_of(&[("REVENUECAT_API_KEY", "  "), ("REVENUECAT_PROJECT_ID", "p")]),
        )
        .unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let err = Config::from_sources(Some("[revenuecat\napi_key ="), env_of(&[])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_page_limit_clamped() {
        let mut config = Config::default();
        config.revenuecat.page_limit = 0;
        assert_eq!(config.page_limit(), 1);
        config.revenuecat.page_limit = 5_000;
        assert_eq!(config.page_limit(), MAX_PAGE_LIMIT);
    }
}
