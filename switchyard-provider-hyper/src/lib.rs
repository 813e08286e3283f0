//! switchyard-provider-hyper
//!
//! Fetch-style client on the `hyper-util` legacy client. Plain HTTP only.
#![deny(unsafe_code)]

pub mod client;
pub mod transport;
pub mod types;

pub use client::{HyperClient, HyperResult};
pub use transport::HyperTransport;
pub use types::FetchOptions;
