//! HTTP Headers Utility
//!
//! Conversions between the string pairs callers like to write and `HeaderMap`.

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{HttpError, Result};

/// Build a `HeaderMap` from string pairs. Later pairs overwrite earlier ones
/// with the same name.
pub fn header_map_from_pairs<'a, I, K, V>(pairs: I) -> Result<HeaderMap>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Validate one header name/value pair.
pub fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| HttpError::InvalidHeader(format!("Invalid header name '{name}': {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| HttpError::InvalidHeader(format!("Invalid header value '{value}': {e}")))?;
    Ok((header_name, header_value))
}

/// Merge `extra` into a copy of `base`; `extra` wins on conflicts.
pub fn merge_headers(base: &HeaderMap, extra: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in extra.keys() {
        merged.remove(name);
        for value in extra.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Flatten a `HeaderMap` into `(name, value)` string pairs, skipping values
/// that are not visible ASCII.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
