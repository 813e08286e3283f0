//! Builder-object request and response types.

use std::time::Duration;

use serde_json::Value;
use switchyard_core::{Merge, Method};

/// A request under construction.
///
/// Interceptors receive the builder and return the one to use from then on.
/// The URL is held separately by the pipeline, so a rewritten URL keeps every
/// setting made here.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    method: Method,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
    form: Vec<(String, String)>,
    json: Option<Value>,
}

impl AgentRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            query: Vec::new(),
            timeout: None,
            form: Vec::new(),
            json: None,
        }
    }

    /// Set one header, replacing any value with the same (case-insensitive) name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn set_all<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.set(name, value))
    }

    /// Append a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_all<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        pairs
            .into_iter()
            .fold(self, |request, (key, value)| request.query(key, value))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a form field; the request is then sent url-encoded.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body. Sending two objects merges their keys, anything
    /// else replaces the previous body.
    pub fn send(mut self, body: Value) -> Self {
        self.json = match (self.json.take(), body) {
            (Some(Value::Object(mut existing)), Value::Object(incoming)) => {
                existing.extend(incoming);
                Some(Value::Object(existing))
            }
            (_, body) => Some(body),
        };
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn form_fields(&self) -> &[(String, String)] {
        &self.form
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}

/// The builder an interceptor returns replaces the previous one entirely.
impl Merge for AgentRequest {
    fn merge(self, incoming: Self) -> Self {
        incoming
    }
}

/// Settings a caller can pass alongside a call; applied to the builder before
/// the request interceptors run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl AgentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn apply(self, request: AgentRequest) -> AgentRequest {
        let request = request.set_all(self.headers).query_all(self.query);
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }
}

/// A received response. The body is read eagerly; `body` holds the parsed
/// JSON when the content type is JSON and `Null` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    url: String,
    text: String,
    body: Value,
}

impl AgentResponse {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        let text = text.into();
        let is_json = headers
            .iter()
            .any(|(name, value)| name == "content-type" && value.contains("json"));
        let body = if is_json {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        Self {
            status,
            status_text: status_text.into(),
            headers,
            url: url.into(),
            text,
            body,
        }
    }

    /// A JSON response, mostly for tests and interceptors.
    pub fn json(status: u16, body: Value) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("");
        Self::new(
            status,
            status_text,
            vec![("content-type".to_string(), "application/json".to_string())],
            "",
            body.to_string(),
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        self.headers.retain(|(n, _)| *n != name);
        self.headers.push((name, value.into()));
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Mutable parsed body; `text` is not re-rendered.
    pub fn body_mut(&mut self) -> &mut Value {
        &mut self.body
    }

    /// Replace the body, keeping `text` in sync.
    pub fn set_body(&mut self, body: Value) {
        self.text = body.to_string();
        self.body = body;
    }
}
