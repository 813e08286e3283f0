//! # switchyard
//!
//! One request/response contract over four HTTP transports. Every client
//! offers `get`, `post`, `put`, `delete` and `request`, ordered request and
//! response interceptors, and optional fire-and-forget response schema
//! validation.
//!
//! | Provider  | Transport                 | Failed statuses                                   |
//! |-----------|---------------------------|---------------------------------------------------|
//! | `hyper`   | `hyper-util` client       | plain status error, no response                   |
//! | `reqwest` | `reqwest::Client`         | response embedded, passed through interceptors    |
//! | `ureq`    | `ureq::Agent`             | response embedded, passed through interceptors    |
//! | `tower`   | service stack on reqwest  | response embedded, interceptors skipped           |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use switchyard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReqwestClient::instance();
//!     client.register_request_interceptors([map_request(|url: String, options: RequestOptions| {
//!         Ok(Intercepted::new(url, options.with_header("x-trace", "on")?))
//!     })]);
//!
//!     let response = client.get("http://localhost:8080/health", None, None).await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```
#![deny(unsafe_code)]

pub mod prelude;
pub mod provider;
pub mod telemetry;

pub use switchyard_core::{
    ClientRegistry, DispatchError, HttpConfig, HttpError, HttpResponse, Intercepted,
    InterceptorPipeline, JsonSchema, Merge, Method, ProviderKind, RequestInterceptor,
    ResponseInterceptor, ResponseSchema, Result, SharedRequestInterceptor,
    SharedResponseInterceptor, SharedSchema, map_request, map_response, request_fn, response_fn,
};

pub mod hyper {
    pub use switchyard_provider_hyper::*;
}

pub mod reqwest {
    pub use switchyard_provider_reqwest::*;
}

pub mod ureq {
    pub use switchyard_provider_ureq::*;
}

pub mod tower {
    pub use switchyard_provider_tower::*;
}

pub use provider::{HttpClient, client_for, get_client, reset_clients};
