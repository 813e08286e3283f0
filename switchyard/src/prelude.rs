//! Commonly used types and functions.

pub use switchyard_core::{
    DispatchError, HttpConfig, HttpError, HttpResponse, Intercepted, JsonSchema, Method,
    ProviderKind, SharedSchema, map_request, map_response, request_fn, response_fn,
};
pub use switchyard_provider_hyper::{FetchOptions, HyperClient};
pub use switchyard_provider_reqwest::{ReqwestClient, RequestOptions};
pub use switchyard_provider_tower::{ConfigResponse, RequestConfig, TowerClient, config_fn, map_config};
pub use switchyard_provider_ureq::{AgentOptions, AgentRequest, AgentResponse, UreqClient};

pub use crate::provider::{HttpClient, get_client};
