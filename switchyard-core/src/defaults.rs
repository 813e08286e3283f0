//! Default values shared by every provider.

/// HTTP client defaults.
pub mod http {
    use std::time::Duration;

    /// Whole-request timeout applied when the caller does not configure one.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// Connection establishment timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// User agent sent by every transport unless overridden.
    pub const USER_AGENT: &str = concat!("switchyard/", env!("CARGO_PKG_VERSION"));
}

/// Response schema validation defaults.
pub mod validation {
    use std::time::Duration;

    /// Upper bound for a detached validation task.
    pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Environment variables read by [`crate::config::HttpConfig::from_env`].
pub mod env {
    pub const HTTP_TIMEOUT: &str = "SWITCHYARD_HTTP_TIMEOUT";
    pub const HTTP_CONNECT_TIMEOUT: &str = "SWITCHYARD_HTTP_CONNECT_TIMEOUT";
    pub const HTTP_PROXY: &str = "SWITCHYARD_HTTP_PROXY";
    pub const USER_AGENT: &str = "SWITCHYARD_USER_AGENT";
}
