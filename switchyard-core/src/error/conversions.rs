//! Type Conversions for HttpError
//!
//! `From` implementations for error types that every crate in the workspace
//! runs into. Transport-specific conversions live in the provider crates.

use super::types::HttpError;

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for HttpError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for HttpError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HttpError = json_err.into();
        assert!(matches!(err, HttpError::Json(_)));
    }

    #[test]
    fn test_from_invalid_header_name() {
        let header_err = http::header::HeaderName::from_bytes(b"bad header").unwrap_err();
        let err: HttpError = header_err.into();
        assert!(matches!(err, HttpError::InvalidHeader(_)));
    }
}
