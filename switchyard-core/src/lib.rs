//! switchyard-core
//!
//! Provider-agnostic interceptor pipeline, error types, and shared HTTP primitives.
#![deny(unsafe_code)]

pub mod config;
pub mod defaults;
pub mod error;
pub mod headers;
pub mod method;
pub mod pipeline;
pub mod registry;
pub mod response;
pub mod schema;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::HttpConfig;
pub use error::{DispatchError, HttpError, Result};
pub use method::Method;
pub use pipeline::{
    Intercepted, InterceptorPipeline, Merge, RequestInterceptor, ResponseInterceptor,
    SharedRequestInterceptor, SharedResponseInterceptor, dispatch_span, map_request,
    map_response, request_fn, response_fn,
};
pub use registry::{ClientRegistry, ProviderKind};
pub use response::HttpResponse;
pub use schema::{JsonSchema, ResponseSchema, SharedSchema, spawn_body_validation, spawn_validation};
pub use transport::{SharedTransport, Transport};
