//! Client trait and configuration for talking to a metadata catalog.
//!
//! Every transport (the REST client, the in-memory mock) implements
//! [`CatalogClient`]; the asset operations and fluent search are written
//! against the trait only.

use crate::secure_string::SecureString;
use async_trait::async_trait;
use mc_core::{
    Asset, AssetUpdate, CatalogResult, DeleteType, IndexSearchRequest, IndexSearchResponse,
    MutationResponse, SaveOptions,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Health status of a catalog connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientHealth {
    Healthy,
    /// Reachable but not fully functional.
    Degraded(String),
    Unhealthy(String),
    Unknown,
}

/// Configuration for a catalog client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client name, used in logs.
    pub name: String,
    /// Base URL of the tenant, e.g. `https://tenant.example.com`.
    pub base_url: String,
    pub auth: AuthConfig,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Whether to verify TLS certificates. Ignored (always on) in release builds.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// Extra headers sent on every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_verify_tls() -> bool {
    true
}

impl ClientConfig {
    /// Config for a tenant using bearer-token auth and default limits.
    pub fn new(base_url: impl Into<String>, token: SecureString) -> Self {
        Self {
            name: "catalog".to_string(),
            base_url: base_url.into(),
            auth: AuthConfig::BearerToken { token },
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            verify_tls: true,
            headers: HashMap::new(),
            rate_limit: None,
        }
    }
}

/// Authentication configuration.
///
/// Credentials are held in [`SecureString`] and zeroized on drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    None,
    ApiKey {
        key: SecureString,
        /// Header carrying the key.
        header_name: String,
    },
    BearerToken {
        token: SecureString,
    },
}

impl AuthConfig {
    /// Returns the credential, if any.
    pub fn secret(&self) -> Option<&SecureString> {
        match self {
            AuthConfig::None => None,
            AuthConfig::ApiKey { key, .. } => Some(key),
            AuthConfig::BearerToken { token } => Some(token),
        }
    }
}

/// Client-side rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per period.
    pub max_requests: u32,
    pub period_secs: u64,
    /// Maximum burst size.
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            period_secs: 60,
            burst_size: 10,
        }
    }
}

/// How much of an asset to return on a direct lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetFetchOptions {
    /// Return minimal detail on related assets.
    pub min_ext_info: bool,
    /// Leave relationships out of the response.
    pub ignore_relationships: bool,
}

impl AssetFetchOptions {
    /// Options for a lookup: full relationships when asked for, none otherwise.
    pub fn with_relationships(include_all_relationships: bool) -> Self {
        Self {
            min_ext_info: !include_all_relationships,
            ignore_relationships: !include_all_relationships,
        }
    }
}

/// Operations a metadata catalog exposes to the SDK.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns the client name.
    fn name(&self) -> &str;

    async fn health_check(&self) -> CatalogResult<ClientHealth>;

    /// Fetches an asset by GUID, whatever its type.
    ///
    /// Fails with `NotFoundByGuid` when no asset has this GUID.
    async fn get_asset_by_guid(&self, guid: &str, options: AssetFetchOptions)
        -> CatalogResult<Asset>;

    /// Fetches an asset by type and qualified name.
    ///
    /// Fails with `NotFoundByQualifiedName` when no such asset exists.
    async fn get_asset_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        options: AssetFetchOptions,
    ) -> CatalogResult<Asset>;

    /// Runs an index search and returns one page of results.
    async fn search(&self, request: IndexSearchRequest) -> CatalogResult<IndexSearchResponse>;

    /// Creates or updates assets from update stubs.
    async fn save(
        &self,
        updates: Vec<AssetUpdate>,
        options: SaveOptions,
    ) -> CatalogResult<MutationResponse>;

    /// Deletes assets by GUID.
    async fn delete(&self, guids: Vec<String>, delete_type: DeleteType)
        -> CatalogResult<MutationResponse>;

    /// Detaches one tag from the asset identified by type and qualified name.
    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_yaml_like_json() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "name": "prod",
            "base_url": "https://tenant.example.com",
            "auth": {"type": "bearer_token", "token": "abc"}
        }))
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.verify_tls);
        assert!(config.rate_limit.is_none());
        assert_eq!(
            config.auth.secret().map(|s| s.expose_secret()),
            Some("abc")
        );
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let config = ClientConfig::new("https://tenant.example.com", "secret-token".into());
        assert!(!format!("{:?}", config).contains("secret-token"));
    }

    #[test]
    fn test_fetch_options() {
        let minimal = AssetFetchOptions::with_relationships(false);
        assert!(minimal.min_ext_info && minimal.ignore_relationships);
        assert_eq!(
            AssetFetchOptions::with_relationships(true),
            AssetFetchOptions::default()
        );
    }

    #[test]
    fn test_rate_limit_default() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.period(), Duration::from_secs(60));
        assert_eq!(config.burst_size, 10);
    }
}
