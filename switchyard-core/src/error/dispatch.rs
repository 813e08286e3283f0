use std::fmt;

use super::types::HttpError;

/// Failure value returned by adapter calls.
///
/// Transports that report non-success statuses as errors attach the response
/// they received; the pipeline may replace it with an intercepted version before
/// the error reaches the caller.
#[derive(Debug)]
pub struct DispatchError<R> {
    kind: HttpError,
    response: Option<R>,
}

impl<R> DispatchError<R> {
    pub fn new(kind: HttpError) -> Self {
        Self {
            kind,
            response: None,
        }
    }

    pub fn with_response(kind: HttpError, response: R) -> Self {
        Self {
            kind,
            response: Some(response),
        }
    }

    pub fn kind(&self) -> &HttpError {
        &self.kind
    }

    pub fn into_kind(self) -> HttpError {
        self.kind
    }

    /// The embedded response, if the transport attached one.
    pub fn response(&self) -> Option<&R> {
        self.response.as_ref()
    }

    pub fn response_mut(&mut self) -> Option<&mut R> {
        self.response.as_mut()
    }

    pub fn take_response(&mut self) -> Option<R> {
        self.response.take()
    }

    pub fn set_response(&mut self, response: R) {
        self.response = Some(response);
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub fn status(&self) -> Option<u16> {
        self.kind.status_code()
    }

    pub fn into_parts(self) -> (HttpError, Option<R>) {
        (self.kind, self.response)
    }

    /// Convert the embedded response into another representation.
    pub fn map_response<U>(self, f: impl FnOnce(R) -> U) -> DispatchError<U> {
        DispatchError {
            kind: self.kind,
            response: self.response.map(f),
        }
    }
}

impl<R> From<HttpError> for DispatchError<R> {
    fn from(kind: HttpError) -> Self {
        Self::new(kind)
    }
}

impl<R> fmt::Display for DispatchError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl<R: fmt::Debug> std::error::Error for DispatchError<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
