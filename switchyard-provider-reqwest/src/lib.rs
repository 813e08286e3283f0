//! switchyard-provider-reqwest
//!
//! Hook-based client on `reqwest`. Non-success statuses fail with the response
//! attached, and that response is routed through the response interceptors.
#![deny(unsafe_code)]

pub mod client;
pub mod transport;
pub mod types;

pub use client::{ReqwestClient, ReqwestResult};
pub use transport::{ReqwestTransport, build_http_client};
pub use types::RequestOptions;
