//! HTTP method tokens accepted by every provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// The closed set of methods a switchyard client dispatches.
///
/// Parsing is case-insensitive; every provider sees the canonical upper-case
/// form regardless of how the caller spelled the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the dispatch contract attaches a request body for this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| HttpError::UnsupportedMethod(s.to_string()))
    }
}

impl TryFrom<&str> for Method {
    type Error = HttpError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = HttpError;

    fn try_from(value: &http::Method) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_casing_to_canonical_form() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(" Post ".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("pUt".parse::<Method>().unwrap().as_str(), "PUT");
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn rejects_tokens_outside_the_set() {
        for token in ["PATCH", "HEAD", "OPTIONS", "", "GETS"] {
            let err = token.parse::<Method>().unwrap_err();
            assert_eq!(err, HttpError::UnsupportedMethod(token.to_string()));
        }
    }

    #[test]
    fn converts_to_and_from_http_method() {
        for method in Method::ALL {
            let http_method: http::Method = method.into();
            assert_eq!(Method::try_from(&http_method).unwrap(), method);
        }
        assert!(Method::try_from(&http::Method::PATCH).is_err());
    }

    #[test]
    fn only_post_and_put_carry_bodies() {
        assert!(!Method::Get.carries_body());
        assert!(Method::Post.carries_body());
        assert!(Method::Put.carries_body());
        assert!(!Method::Delete.carries_body());
    }

    #[test]
    fn serde_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Method::Delete).unwrap(), "\"DELETE\"");
        let parsed: Method = serde_json::from_str("\"PUT\"").unwrap();
        assert_eq!(parsed, Method::Put);
    }
}
