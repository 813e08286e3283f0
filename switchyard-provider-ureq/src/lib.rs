//! switchyard-provider-ureq
//!
//! Builder-object client on `ureq`. Blocking calls run on tokio's blocking
//! pool; non-success statuses fail with the response attached.
#![deny(unsafe_code)]

pub mod client;
pub mod transport;
pub mod types;

pub use client::{UreqClient, UreqResult};
pub use transport::UreqTransport;
pub use types::{AgentOptions, AgentRequest, AgentResponse};
