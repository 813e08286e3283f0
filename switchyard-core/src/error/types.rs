use thiserror::Error;

/// Failure kinds shared by every provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The method token is outside GET, POST, PUT, DELETE.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The provider token does not name a known provider.
    #[error("This provider is not supported: {0}")]
    UnsupportedProvider(String),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Network level failure reported by the transport.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("HTTP error! Status: {status} {status_text}")]
    Status { status: u16, status_text: String },

    /// A request or response interceptor failed.
    #[error("Interceptor failed: {0}")]
    Interceptor(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    #[error("Schema compilation error: {0}")]
    SchemaCompilation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HttpError {
    /// Shorthand for interceptor authors.
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// Build a status error from a numeric code, filling in the canonical reason.
    pub fn status(status: u16) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self::Status {
            status,
            status_text,
        }
    }

    /// HTTP status code, when this error is a status failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fills_canonical_reason() {
        let err = HttpError::status(404);
        assert_eq!(err.to_string(), "HTTP error! Status: 404 Not Found");
        assert_eq!(err.status_code(), Some(404));
        assert!(err.is_status());
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let err = HttpError::status(599);
        assert_eq!(
            err,
            HttpError::Status {
                status: 599,
                status_text: String::new()
            }
        );
    }

    #[test]
    fn non_status_errors_have_no_code() {
        assert_eq!(HttpError::Transport("refused".into()).status_code(), None);
        assert!(HttpError::Timeout("30s".into()).is_timeout());
    }
}
