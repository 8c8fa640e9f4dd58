//! Configuration loading for the catalog CLI.

use anyhow::{bail, Context, Result};
use mc_client::{AuthConfig, ClientConfig, RateLimitConfig, SecureString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "MC_API_TOKEN";
/// Environment variable holding the tenant URL.
pub const BASE_URL_ENV: &str = "MC_BASE_URL";

const REDACTED: &str = "***REDACTED***";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tenant connection settings.
    #[serde(default)]
    pub tenant: TenantConfig,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Overlays values from the environment onto this config.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            SecureString::from_env(TOKEN_ENV),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, token: Option<SecureString>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.tenant.base_url = url;
        }
        if let Some(token) = token {
            self.tenant.api_token = token.expose_secret().to_string();
        }
    }

    /// Creates a copy with secrets redacted.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();
        if !config.tenant.api_token.is_empty() {
            config.tenant.api_token = REDACTED.to_string();
        }
        for value in config.tenant.headers.values_mut() {
            *value = REDACTED.to_string();
        }
        config
    }

    /// Builds the client config for the configured tenant.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let tenant = &self.tenant;
        if tenant.base_url.trim().is_empty() {
            bail!(
                "No tenant URL configured. Set tenant.base_url, {} or --base-url",
                BASE_URL_ENV
            );
        }
        let auth = if tenant.api_token.is_empty() {
            AuthConfig::None
        } else {
            AuthConfig::BearerToken {
                token: SecureString::from(tenant.api_token.as_str()),
            }
        };

        Ok(ClientConfig {
            name: "mc-cli".to_string(),
            base_url: tenant.base_url.clone(),
            auth,
            timeout_secs: tenant.timeout_secs,
            max_retries: tenant.max_retries,
            verify_tls: tenant.verify_tls,
            headers: tenant.headers.clone(),
            rate_limit: tenant.rate_limit.clone(),
        })
    }
}

/// Tenant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Base URL of the tenant, e.g. `https://acme.atlan.com`.
    #[serde(default)]
    pub base_url: String,

    /// API token. Usually supplied through the environment instead.
    #[serde(default)]
    pub api_token: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Extra headers sent on every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            verify_tls: true,
            headers: HashMap::new(),
            rate_limit: None,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Results shown when `--limit` is not given.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_page_size() -> u32 {
    100
}

fn default_limit() -> usize {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_limit: default_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines.
    #[serde(default)]
    pub json_format: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.tenant.base_url.is_empty());
        assert_eq!(config.tenant.timeout_secs, 30);
        assert_eq!(config.tenant.max_retries, 3);
        assert_eq!(config.search.page_size, 100);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
tenant:
  base_url: https://acme.atlan.com
  max_retries: 5
  rate_limit:
    max_requests: 50
    period_secs: 10
    burst_size: 5

search:
  default_limit: 50
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tenant.base_url, "https://acme.atlan.com");
        assert_eq!(config.tenant.max_retries, 5);
        assert_eq!(config.tenant.timeout_secs, 30);
        assert!(config.tenant.verify_tls);
        assert_eq!(config.tenant.rate_limit.map(|r| r.max_requests), Some(50));
        assert_eq!(config.search.default_limit, 50);
        assert_eq!(config.search.page_size, 100);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tenant:\n  base_url: https://file.example.com").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.tenant.base_url, "https://file.example.com");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = AppConfig::default();
        config.tenant.base_url = "https://saved.example.com".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.tenant.base_url, "https://saved.example.com");
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.tenant.base_url = "https://file.example.com".to_string();

        config.apply_overrides(Some("  ".to_string()), Some(SecureString::from("env-token")));
        assert_eq!(config.tenant.base_url, "https://file.example.com");
        assert_eq!(config.tenant.api_token, "env-token");

        config.apply_overrides(Some("https://env.example.com".to_string()), None);
        assert_eq!(config.tenant.base_url, "https://env.example.com");
        assert_eq!(config.tenant.api_token, "env-token");
    }

    #[test]
    fn test_redact_secrets() {
        let mut config = AppConfig::default();
        config.tenant.api_token = "secret-token".to_string();
        config
            .tenant
            .headers
            .insert("x-api-key".to_string(), "header-secret".to_string());

        let redacted = config.redact_secrets();
        assert_eq!(redacted.tenant.api_token, REDACTED);
        assert_eq!(redacted.tenant.headers["x-api-key"], REDACTED);
        assert_eq!(config.tenant.api_token, "secret-token");
    }

    #[test]
    fn test_client_config() {
        let mut config = AppConfig::default();
        assert!(config.client_config().is_err());

        config.tenant.base_url = "https://acme.atlan.com".to_string();
        let client = config.client_config().unwrap();
        assert!(matches!(client.auth, AuthConfig::None));

        config.tenant.api_token = "t0k3n".to_string();
        let client = config.client_config().unwrap();
        assert!(matches!(client.auth, AuthConfig::BearerToken { .. }));
        assert_eq!(client.max_retries, 3);
    }
}
