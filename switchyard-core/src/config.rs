//! HTTP configuration types.
//!
//! This module defines `HttpConfig` and its builder, used to configure the
//! transport behind every provider.

use std::collections::HashMap;
use std::time::Duration;

use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{HttpError, Result};

/// HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
}

/// Builder for `HttpConfig`
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: HashMap<String, String>,
    proxy: Option<String>,
    user_agent: Option<String>,
}

impl HttpConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.user_agent = user_agent.map(|s| s.into());
        self
    }
    pub fn proxy<S: Into<String>>(mut self, proxy: Option<S>) -> Self {
        self.proxy = proxy.map(|s| s.into());
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Build the configuration
    pub fn build(self) -> HttpConfig {
        HttpConfig {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            headers: self.headers,
            proxy: self.proxy,
            user_agent: self.user_agent,
        }
    }
}

impl HttpConfig {
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }

    /// Defaults overlaid with `SWITCHYARD_*` environment variables.
    ///
    /// Unparseable timeout values are ignored with a warning rather than
    /// failing client construction.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(timeout) = env_seconds(defaults::env::HTTP_TIMEOUT) {
            config.timeout = Some(timeout);
        }
        if let Some(timeout) = env_seconds(defaults::env::HTTP_CONNECT_TIMEOUT) {
            config.connect_timeout = Some(timeout);
        }
        if let Some(proxy) = env_non_empty(defaults::env::HTTP_PROXY) {
            config.proxy = Some(proxy);
        }
        if let Some(user_agent) = env_non_empty(defaults::env::USER_AGENT) {
            config.user_agent = Some(user_agent);
        }

        config
    }

    /// Configured headers as a `HeaderMap`, user agent excluded.
    pub fn default_headers(&self) -> Result<HeaderMap> {
        crate::headers::header_map_from_pairs(&self.headers).map_err(|e| {
            HttpError::Configuration(format!("Invalid default header: {e}"))
        })
    }

    /// Like [`default_headers`](Self::default_headers), but invalid entries are
    /// skipped with a warning. Transports use this so that construction never fails.
    pub fn default_headers_lossy(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            match crate::headers::parse_header(name, value) {
                Ok((name, value)) => {
                    headers.insert(name, value);
                }
                Err(e) => {
                    tracing::warn!(target: "switchyard::config", error = %e, "skipping invalid default header");
                }
            }
        }
        headers
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            proxy: None,
            user_agent: Some(defaults::http::USER_AGENT.to_string()),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_seconds(key: &str) -> Option<Duration> {
    let raw = env_non_empty(key)?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(target: "switchyard::config", key, value = %raw, "ignoring non-numeric timeout");
            None
        }
    }
}

// Helper module for Duration serialization
mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    const CONFIG_VARS: [&str; 4] = [
        defaults::env::HTTP_TIMEOUT,
        defaults::env::HTTP_CONNECT_TIMEOUT,
        defaults::env::HTTP_PROXY,
        defaults::env::USER_AGENT,
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Exclusive access to the `SWITCHYARD_*` config variables.
    ///
    /// All of them are cleared on creation and put back on drop.
    struct ConfigEnv {
        saved: Vec<(&'static str, Option<String>)>,
        _lock: MutexGuard<'static, ()>,
    }

    #[allow(unsafe_code)]
    impl ConfigEnv {
        fn clean() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            let saved = CONFIG_VARS
                .iter()
                .map(|&key| (key, std::env::var(key).ok()))
                .collect();
            for key in CONFIG_VARS {
                unsafe { std::env::remove_var(key) };
            }
            Self { saved, _lock: lock }
        }

        fn set(&self, key: &'static str, value: &str) -> &Self {
            debug_assert!(CONFIG_VARS.contains(&key), "{key} is not a config variable");
            unsafe { std::env::set_var(key, value) };
            self
        }
    }

    #[allow(unsafe_code)]
    impl Drop for ConfigEnv {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(value) => unsafe { std::env::set_var(key, value) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
        }
    }

    #[test]
    fn default_uses_crate_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Some(defaults::http::REQUEST_TIMEOUT));
        assert_eq!(config.connect_timeout, Some(defaults::http::CONNECT_TIMEOUT));
        assert_eq!(config.user_agent.as_deref(), Some(defaults::http::USER_AGENT));
        assert!(config.proxy.is_none());
    }

    #[test]
    fn builder_collects_headers() {
        let config = HttpConfig::builder()
            .timeout(Some(Duration::from_secs(3)))
            .header("x-a", "1")
            .headers(HashMap::from([("x-b".to_string(), "2".to_string())]))
            .build();

        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.user_agent, None);
        let headers = config.default_headers().unwrap();
        assert_eq!(headers.get("x-a").unwrap(), "1");
        assert_eq!(headers.get("x-b").unwrap(), "2");
    }

    #[test]
    fn invalid_default_header_is_a_configuration_error() {
        let config = HttpConfig::builder().header("bad header", "v").build();
        assert!(matches!(
            config.default_headers(),
            Err(HttpError::Configuration(_))
        ));
    }

    #[test]
    fn lossy_headers_skip_invalid_entries() {
        let config = HttpConfig::builder()
            .header("bad header", "v")
            .header("x-good", "1")
            .build();
        let headers = config.default_headers_lossy();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-good").unwrap(), "1");
    }

    #[test]
    fn serde_round_trips_durations_as_seconds() {
        let config = HttpConfig::builder()
            .timeout(Some(Duration::from_secs(12)))
            .build();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["timeout"], 12);
        assert!(value["connect_timeout"].is_null());

        let back: HttpConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn from_env_overlays_variables() {
        let env = ConfigEnv::clean();
        env.set(defaults::env::HTTP_TIMEOUT, "7")
            .set(defaults::env::HTTP_CONNECT_TIMEOUT, "soon")
            .set(defaults::env::HTTP_PROXY, "http://proxy.local:3128");

        let config = HttpConfig::from_env();
        assert_eq!(config.timeout, Some(Duration::from_secs(7)));
        assert_eq!(config.connect_timeout, Some(defaults::http::CONNECT_TIMEOUT));
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.user_agent.as_deref(), Some(defaults::http::USER_AGENT));
    }

    #[test]
    fn from_env_without_variables_matches_default() {
        let _env = ConfigEnv::clean();
        assert_eq!(HttpConfig::from_env(), HttpConfig::default());
    }

    #[test]
    fn blank_values_are_ignored() {
        let env = ConfigEnv::clean();
        env.set(defaults::env::HTTP_PROXY, "")
            .set(defaults::env::USER_AGENT, "custom-agent/2");

        let config = HttpConfig::from_env();
        assert!(config.proxy.is_none());
        assert_eq!(config.user_agent.as_deref(), Some("custom-agent/2"));
    }
}
