//! Request options for the hook-based client.

use std::time::Duration;

use http::HeaderMap;
use serde_json::Value;
use switchyard_core::headers::parse_header;
use switchyard_core::{Merge, Method, Result};

/// Per-request options.
///
/// `json` takes precedence over `body` when both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Option<HeaderMap>,
    /// Serialized as the JSON request body.
    pub json: Option<Value>,
    /// Raw text body.
    pub body: Option<String>,
    /// Query pairs appended to the URL.
    pub search_params: Option<Vec<(String, String)>>,
    /// Base URL the request URL is resolved against.
    pub prefix_url: Option<String>,
    pub timeout: Option<Duration>,
    /// When `Some(false)`, non-success statuses are returned as `Ok`.
    pub throw_http_errors: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse_header(name, value)?;
        self.headers.get_or_insert_with(HeaderMap::new).insert(name, value);
        Ok(self)
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_search_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.search_params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    pub fn with_prefix_url(mut self, prefix_url: impl Into<String>) -> Self {
        self.prefix_url = Some(prefix_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_throw_http_errors(mut self, throw: bool) -> Self {
        self.throw_http_errors = Some(throw);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
    }

    /// Whether non-success statuses should fail the call.
    pub fn throws_http_errors(&self) -> bool {
        self.throw_http_errors.unwrap_or(true)
    }

    /// The request URL after applying `prefix_url`.
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.prefix_url {
            Some(prefix) => format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => url.to_string(),
        }
    }
}

impl Merge for RequestOptions {
    fn merge(self, incoming: Self) -> Self {
        Self {
            method: incoming.method.or(self.method),
            headers: incoming.headers.or(self.headers),
            json: incoming.json.or(self.json),
            body: incoming.body.or(self.body),
            search_params: incoming.search_params.or(self.search_params),
            prefix_url: incoming.prefix_url.or(self.prefix_url),
            timeout: incoming.timeout.or(self.timeout),
            throw_http_errors: incoming.throw_http_errors.or(self.throw_http_errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_prior_keys() {
        let base = RequestOptions::new()
            .with_method(Method::Post)
            .with_json(json!({"a": 1}))
            .with_throw_http_errors(false);
        let update = RequestOptions::new().with_search_param("page", "2");

        let merged = base.merge(update);
        assert_eq!(merged.method, Some(Method::Post));
        assert_eq!(merged.json, Some(json!({"a": 1})));
        assert!(!merged.throws_http_errors());
        assert_eq!(
            merged.search_params,
            Some(vec![("page".to_string(), "2".to_string())])
        );
    }

    #[test]
    fn prefix_url_joins_with_single_slash() {
        let options = RequestOptions::new().with_prefix_url("http://api.local/v1/");
        assert_eq!(options.resolve_url("/users"), "http://api.local/v1/users");
        assert_eq!(options.resolve_url("users"), "http://api.local/v1/users");
        assert_eq!(RequestOptions::new().resolve_url("/users"), "/users");
    }

    #[test]
    fn http_errors_throw_by_default() {
        assert!(RequestOptions::new().throws_http_errors());
    }
}
