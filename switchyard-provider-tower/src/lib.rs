//! switchyard-provider-tower
//!
//! Config-object client whose interceptors are layers of a `tower` service
//! stack over `reqwest`. Non-success statuses fail with the response attached
//! and skip the response interceptors.
#![deny(unsafe_code)]

pub mod client;
pub mod transport;
pub mod types;

pub use client::{TowerClient, TowerClientResult};
pub use transport::{ConfigService, InterceptingTransport, TowerTransport};
pub use types::{ConfigInterceptor, ConfigResponse, RequestConfig, SharedConfigInterceptor, config_fn, map_config};
