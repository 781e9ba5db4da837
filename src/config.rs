use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the search API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Environment variable holding the custom search engine id.
pub const ENGINE_ID_ENV: &str = "GOOGLE_SEARCH_ENGINE_ID";
/// Environment variable holding the shared secret for the check trigger.
pub const CRON_SECRET_ENV: &str = "CRON_SECRET";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckConfig {
    /// Pause between two keywords, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

impl CheckConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Maximum number of data points returned per keyword.
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> i64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.search.timeout_secs == 0 {
        anyhow::bail!("search.timeout_secs must be > 0");
    }

    let endpoint = url::Url::parse(&config.search.endpoint)
        .with_context(|| format!("search.endpoint is not a valid URL: {}", config.search.endpoint))?;
    match endpoint.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("search.endpoint must be http or https, got '{}'", other),
    }

    if config.history.limit < 1 {
        anyhow::bail!("history.limit must be >= 1");
    }

    Ok(config)
}

/// Read a secret from the environment, treating an empty value as unset.
pub fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse_config("[db]\npath = \"./data/rt.sqlite\"\n").unwrap();
        assert_eq!(cfg.search.endpoint, "https://www.googleapis.com/customsearch/v1");
        assert_eq!(cfg.search.timeout_secs, 30);
        assert_eq!(cfg.check.delay(), Duration::from_secs(1));
        assert_eq!(cfg.history.limit, 30);
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
    }

    #[test]
    fn test_missing_db_section_fails() {
        assert!(parse_config("[check]\ndelay_ms = 0\n").is_err());
    }

    #[test]
    fn test_rejects_zero_history_limit() {
        let err = parse_config("[db]\npath = \"x\"\n[history]\nlimit = 0\n").unwrap_err();
        assert!(err.to_string().contains("history.limit"));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err = parse_config("[db]\npath = \"x\"\n[search]\nendpoint = \"ftp://host/x\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(parse_config("[db]\npath = \"x\"\n[search]\ntimeout_secs = 0\n").is_err());
    }
}
