//! HTTP transport with retry, rate limiting, and response caching.

use crate::traits::{AuthConfig, ClientConfig, RateLimitConfig};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use mc_core::{CatalogError, CatalogResult};
use moka::future::Cache as MokaCache;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Query-string parameters; keys may repeat.
pub type QueryParams = [(&'static str, String)];

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP client for the catalog's REST API.
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

/// Error body returned by the catalog.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl ErrorBody {
    fn describe(text: &str) -> String {
        match serde_json::from_str::<ErrorBody>(text) {
            Ok(ErrorBody {
                error_code: Some(code),
                error_message: Some(message),
            }) => format!("{}: {}", code, message),
            Ok(ErrorBody {
                error_message: Some(message),
                ..
            }) => message,
            _ => text.chars().take(500).collect(),
        }
    }
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        // TLS verification cannot be disabled in release builds
        let verify_tls = if !config.verify_tls {
            if can_disable_tls_verification() {
                warn!(
                    base_url = %config.base_url,
                    client = %config.name,
                    "TLS certificate verification DISABLED in development mode"
                );
                false
            } else {
                warn!(
                    base_url = %config.base_url,
                    client = %config.name,
                    "Ignoring request to disable TLS verification in a release build"
                );
                true
            }
        } else {
            true
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::try_from(key.as_str()),
                reqwest::header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, val);
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::ConfigError(e.to_string()))?;

        let rate_limiter = config
            .rate_limit
            .as_ref()
            .map(build_rate_limiter)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Joins a path onto the base URL.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET and deserialize the JSON response.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> CatalogResult<R> {
        let request = self.request(Method::GET, path, query);
        let response = self.execute_with_retry(request).await?;
        parse_json_response(response).await
    }

    /// POST a JSON body and deserialize the JSON response.
    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
        body: &T,
    ) -> CatalogResult<R> {
        let request = self.request(Method::POST, path, query).json(body);
        let response = self.execute_with_retry(request).await?;
        parse_json_response(response).await
    }

    /// DELETE and deserialize the JSON response.
    pub async fn delete_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> CatalogResult<R> {
        let request = self.request(Method::DELETE, path, query);
        let response = self.execute_with_retry(request).await?;
        parse_json_response(response).await
    }

    /// DELETE, discarding the response body.
    pub async fn delete(&self, path: &str, query: &QueryParams) -> CatalogResult<()> {
        let request = self.request(Method::DELETE, path, query);
        self.execute_with_retry(request).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str, query: &QueryParams) -> RequestBuilder {
        let request = self.client.request(method, self.build_url(path));
        if query.is_empty() {
            request
        } else {
            request.query(query)
        }
    }

    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey { key, header_name } => {
                request.header(header_name, key.expose_secret())
            }
            AuthConfig::BearerToken { token } => request.bearer_auth(token.expose_secret()),
        }
    }

    /// Sends a request with auth and rate limiting, retrying server errors,
    /// transport errors, and 429s.
    async fn execute_with_retry(&self, request: RequestBuilder) -> CatalogResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let request = self.add_auth(request);
        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(attempt, ?delay, "Retrying catalog request");
                sleep(delay).await;
                delay = next_delay(delay);
            }

            let attempt_request = request
                .try_clone()
                .ok_or_else(|| CatalogError::Internal("Failed to clone request".to_string()))?;

            match attempt_request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = retry_after_secs(&response);
                        if attempt < self.config.max_retries {
                            warn!(retry_after, "Rate limited by catalog, waiting");
                            sleep(Duration::from_secs(retry_after)).await;
                            continue;
                        }
                        return Err(CatalogError::RateLimited(retry_after));
                    }

                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!(%status, "Catalog server error, retrying");
                        last_error = Some(CatalogError::RequestFailed(format!(
                            "Server error: {}",
                            status
                        )));
                        continue;
                    }

                    if status.is_client_error() || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(error_for_status(status, &body));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        CatalogError::Timeout(e.to_string())
                    } else if e.is_connect() {
                        CatalogError::ConnectionFailed(e.to_string())
                    } else {
                        CatalogError::RequestFailed(e.to_string())
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CatalogError::Internal("Unknown error".to_string())))
    }
}

fn build_rate_limiter(rl: &RateLimitConfig) -> CatalogResult<RateLimiterType> {
    let per_request = rl.period() / rl.max_requests.max(1);
    let quota = Quota::with_period(per_request)
        .ok_or_else(|| CatalogError::ConfigError("Rate limit period must be non-zero".into()))?
        .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
    Ok(GovernorRateLimiter::direct(quota))
}

async fn parse_json_response<T: DeserializeOwned>(response: Response) -> CatalogResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

    serde_json::from_str(&text).map_err(|e| {
        CatalogError::InvalidResponse(format!(
            "Failed to parse response (status {}): {} - Body: {}",
            status,
            e,
            text.chars().take(500).collect::<String>()
        ))
    })
}

/// Maps a non-success status to a typed error.
fn error_for_status(status: StatusCode, body: &str) -> CatalogError {
    let detail = ErrorBody::describe(body);
    match status {
        StatusCode::UNAUTHORIZED => CatalogError::AuthenticationFailed(detail),
        StatusCode::FORBIDDEN => CatalogError::AuthorizationDenied(detail),
        StatusCode::NOT_FOUND => CatalogError::NotFound(detail),
        StatusCode::BAD_REQUEST => CatalogError::InvalidRequest(detail),
        s if s.is_server_error() => {
            CatalogError::RequestFailed(format!("Server error: {} - {}", s, detail))
        }
        s => CatalogError::RequestFailed(format!("Client error: {} - {}", s, detail)),
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Doubles the delay, adds jitter, and caps it.
fn next_delay(delay: Duration) -> Duration {
    std::cmp::min(delay * 2 + rand_jitter(), MAX_BACKOFF)
}

fn rand_jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}

/// Whether TLS verification may be turned off. Always false in release builds.
#[inline]
pub fn can_disable_tls_verification() -> bool {
    cfg!(debug_assertions)
}

/// TTL cache for responses that change rarely.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Gets a value or loads it with a fallible async function.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.cache.get(&key).await {
            return Ok(v);
        }
        let value = f().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_client_config;

    #[test]
    fn test_build_url() {
        let client = HttpClient::new(test_client_config("https://tenant.example.com/")).unwrap();

        assert_eq!(
            client.build_url("/api/meta/search/indexsearch"),
            "https://tenant.example.com/api/meta/search/indexsearch"
        );
        assert_eq!(
            client.build_url("api/meta/entity/bulk"),
            "https://tenant.example.com/api/meta/entity/bulk"
        );
    }

    #[test]
    fn test_rate_limited_client_builds() {
        let mut config = test_client_config("https://tenant.example.com");
        config.rate_limit = Some(RateLimitConfig::default());
        assert!(HttpClient::new(config).is_ok());
    }

    #[test]
    fn test_zero_period_rate_limit_is_config_error() {
        let mut config = test_client_config("https://tenant.example.com");
        config.rate_limit = Some(RateLimitConfig {
            max_requests: 10,
            period_secs: 0,
            burst_size: 1,
        });
        assert!(matches!(
            HttpClient::new(config),
            Err(CatalogError::ConfigError(_))
        ));
    }

    #[test]
    fn test_error_for_status() {
        let body = r#"{"errorCode":"ATLAS-404-00-005","errorMessage":"Given instance guid abc is invalid/not found"}"#;
        match error_for_status(StatusCode::NOT_FOUND, body) {
            CatalogError::NotFound(detail) => {
                assert!(detail.starts_with("ATLAS-404-00-005"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            CatalogError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, "plain text"),
            CatalogError::InvalidRequest(ref d) if d == "plain text"
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, ""),
            CatalogError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_backoff_is_capped() {
        let mut delay = Duration::from_millis(100);
        for _ in 0..20 {
            delay = next_delay(delay);
        }
        assert_eq!(delay, MAX_BACKOFF);
        assert!(next_delay(Duration::from_millis(100)) >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_response_cache_loads_once() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 10);

        let first: Result<String, CatalogError> = cache
            .get_or_try_insert_with("k".to_string(), || async { Ok("v1".to_string()) })
            .await;
        let second: Result<String, CatalogError> = cache
            .get_or_try_insert_with("k".to_string(), || async { Ok("v2".to_string()) })
            .await;
        assert_eq!(first.unwrap(), "v1");
        assert_eq!(second.unwrap(), "v1");

        cache.invalidate("k").await;
        assert_eq!(cache.get("k").await, None);
    }
}
