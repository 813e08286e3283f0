//! Request configuration and response types for the tower client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use switchyard_core::headers::parse_header;
use switchyard_core::{Method, Result};

/// Everything needed to perform one call. Request interceptors receive and
/// return the whole config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    /// Prepended to relative `url`s.
    pub base_url: Option<String>,
    pub headers: HeaderMap,
    /// Query pairs.
    pub params: Vec<(String, String)>,
    /// JSON request body.
    pub data: Option<Value>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `url` resolved against `base_url`, unless it is already absolute.
    pub fn full_url(&self) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(&self.url) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.url.trim_start_matches('/')
            ),
            _ => self.url.clone(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.split_once("://")
        .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)))
}

/// A received response with its body decoded.
///
/// `data` holds parsed JSON, the raw text as a JSON string when the body is
/// not JSON, or `Null` for an empty body.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigResponse {
    pub data: Value,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The config the request was sent with, after request interceptors.
    pub config: RequestConfig,
}

impl ConfigResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, data: Value, config: RequestConfig) -> Self {
        Self {
            data,
            status,
            headers,
            config,
        }
    }

    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Decode a response body into [`ConfigResponse::data`].
pub fn decode_data(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// A request interceptor registered natively on the service stack.
#[async_trait]
pub trait ConfigInterceptor: Send + Sync {
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig>;
}

pub type SharedConfigInterceptor = Arc<dyn ConfigInterceptor>;

#[async_trait]
impl<F, Fut> ConfigInterceptor for F
where
    F: Fn(RequestConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
{
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig> {
        (self)(config).await
    }
}

struct MapConfig<F>(F);

#[async_trait]
impl<F> ConfigInterceptor for MapConfig<F>
where
    F: Fn(RequestConfig) -> Result<RequestConfig> + Send + Sync,
{
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig> {
        (self.0)(config)
    }
}

/// Wrap a synchronous config transform.
pub fn map_config<F>(f: F) -> SharedConfigInterceptor
where
    F: Fn(RequestConfig) -> Result<RequestConfig> + Send + Sync + 'static,
{
    Arc::new(MapConfig(f))
}

/// Wrap an asynchronous config transform.
pub fn config_fn<F, Fut>(f: F) -> SharedConfigInterceptor
where
    F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_url_joins_relative_urls() {
        let config = RequestConfig {
            url: "/users".into(),
            ..RequestConfig::new().with_base_url("http://api.local/v1/")
        };
        assert_eq!(config.full_url(), "http://api.local/v1/users");
    }

    #[test]
    fn absolute_url_ignores_base() {
        let config = RequestConfig {
            url: "http://other.local/x".into(),
            ..RequestConfig::new().with_base_url("http://api.local")
        };
        assert_eq!(config.full_url(), "http://other.local/x");
    }

    #[test]
    fn data_decoding() {
        assert_eq!(decode_data(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_data(b"hello"), json!("hello"));
        assert_eq!(decode_data(b""), Value::Null);
    }

    #[test]
    fn status_text_is_canonical() {
        let response = ConfigResponse::new(
            StatusCode::CREATED,
            HeaderMap::new(),
            Value::Null,
            RequestConfig::new(),
        );
        assert_eq!(response.status_text(), "Created");
        assert!(response.is_success());
    }
}
