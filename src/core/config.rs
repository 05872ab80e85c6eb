use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Deadline for a single attempt.
    pub timeout_ms: u64,
    pub max_attempts: usize,
    /// Backoff unit; the wait grows linearly with the attempts made.
    pub retry_base_delay_ms: u64,
    pub cache_ttl_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "https://api.binance.com/api/v3".to_string(),
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            cache_ttl_secs: 20,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "coinrelay", "coinrelay")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind: "127.0.0.1"
  port: 9000
upstream:
  base_url: "http://localhost:1234/api/v3"
  timeout_ms: 500
  max_attempts: 5
  retry_base_delay_ms: 10
  cache_ttl_secs: 60
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upstream.base_url, "http://localhost:1234/api/v3");
        assert_eq!(config.upstream.timeout(), Duration::from_millis(500));
        assert_eq!(config.upstream.max_attempts, 5);
        assert_eq!(config.upstream.retry_base_delay(), Duration::from_millis(10));
        assert_eq!(config.upstream.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
upstream:
  cache_ttl_secs: 5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.upstream.cache_ttl_secs, 5);
        assert_eq!(config.upstream.max_attempts, 3);
        assert_eq!(config.upstream.base_url, "https://api.binance.com/api/v3");
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_load_from_missing_path_fails_with_context() {
        let err = AppConfig::load_from_path("/nonexistent/coinrelay.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
