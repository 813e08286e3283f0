//! Request options for the fetch-style client.

use std::time::Duration;

use http::HeaderMap;
use switchyard_core::headers::parse_header;
use switchyard_core::{Merge, Method, Result};

/// Per-request options, the fetch `RequestInit` equivalent.
///
/// Every field is optional so interceptors can return only what they change;
/// see the [`Merge`] impl.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub method: Option<Method>,
    pub headers: Option<HeaderMap>,
    /// Request body, already serialized.
    pub body: Option<String>,
    /// Whole-call timeout overriding the transport default.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
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

    /// Add one header, creating the header map if needed.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse_header(name, value)?;
        self.headers.get_or_insert_with(HeaderMap::new).insert(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
    }
}

/// Shallow merge: fields set on `incoming` win, unset fields keep the prior value.
impl Merge for FetchOptions {
    fn merge(self, incoming: Self) -> Self {
        Self {
            method: incoming.method.or(self.method),
            headers: incoming.headers.or(self.headers),
            body: incoming.body.or(self.body),
            timeout: incoming.timeout.or(self.timeout),
        }
    }
}
