//! Buffered HTTP response shared by the `hyper` and `reqwest` providers.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A fully buffered response.
///
/// Bodies are read to completion by the transport so that interceptors can
/// inspect and rewrite them, and so that schema validation can parse a copy
/// without consuming the caller's body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, url: impl Into<String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            url: url.into(),
            body,
        }
    }

    /// A response with a JSON body and `content-type: application/json`.
    pub fn json_response(status: StatusCode, value: &serde_json::Value) -> Result<Self> {
        Self::new(status, HeaderMap::new(), "", Bytes::new()).with_json(value)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Canonical reason phrase, e.g. `Not Found`.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Final URL the response was served from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.headers.remove(CONTENT_LENGTH);
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    /// Replace the body with serialized JSON.
    pub fn with_json(mut self, value: &serde_json::Value) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        self.set_body(body);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }
}

impl From<http::Response<Bytes>> for HttpResponse {
    fn from(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, "", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_response_sets_content_type() {
        let response = HttpResponse::json_response(StatusCode::OK, &json!({"value": 1})).unwrap();
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.json_value().unwrap(), json!({"value": 1}));
        assert!(response.is_success());
    }

    #[test]
    fn set_body_drops_stale_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2"));
        let mut response = HttpResponse::new(StatusCode::OK, headers, "http://x", Bytes::from("{}"));

        response.set_body("{\"a\":1}");
        assert!(response.header("content-length").is_none());
        assert_eq!(response.text(), "{\"a\":1}");
    }

    #[test]
    fn status_text_is_canonical() {
        let response = HttpResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "", Bytes::new());
        assert_eq!(response.status_text(), "Not Found");
        assert!(!response.is_success());
    }

    #[test]
    fn invalid_json_body_is_a_json_error() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "", Bytes::from("nope"));
        assert!(matches!(
            response.json_value(),
            Err(crate::error::HttpError::Json(_))
        ));
    }

    #[test]
    fn converts_from_http_response() {
        let raw = http::Response::builder()
            .status(201)
            .header("x-id", "7")
            .body(Bytes::from_static(b"ok"))
            .unwrap();
        let response = HttpResponse::from(raw);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.header("x-id"), Some("7"));
        assert_eq!(response.text(), "ok");
    }
}
