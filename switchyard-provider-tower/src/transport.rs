//! Service stack transport.
//!
//! The base service performs the HTTP call with `reqwest`. Every registered
//! request interceptor becomes an [`AsyncFilter`] in front of it and every
//! response interceptor an `and_then` step behind it, so the interceptors run
//! as part of the service itself rather than around it.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use switchyard_core::{DispatchError, HttpConfig, HttpError, SharedResponseInterceptor};
use switchyard_provider_reqwest::transport::{
    buffer_response, build_http_client_or_default, map_reqwest_error,
};
use tower::filter::AsyncFilter;
use tower::util::BoxCloneService;
use tower::{BoxError, ServiceExt};

use crate::types::{ConfigResponse, RequestConfig, SharedConfigInterceptor, decode_data};

pub type TowerResult = Result<ConfigResponse, DispatchError<ConfigResponse>>;

/// The boxed service every layer wraps.
pub type ConfigService = BoxCloneService<RequestConfig, ConfigResponse, BoxError>;

/// A transport that owns its interceptors.
#[async_trait]
pub trait InterceptingTransport: Send + Sync {
    fn use_request(&self, interceptor: SharedConfigInterceptor);

    fn use_response(&self, interceptor: SharedResponseInterceptor<ConfigResponse>);

    /// Run `config` through the request interceptors, the call, and the
    /// response interceptors. Non-success responses skip the response
    /// interceptors and fail with the response attached.
    async fn request(&self, config: RequestConfig) -> TowerResult;
}

struct ServiceStack {
    base: ConfigService,
    request: Vec<SharedConfigInterceptor>,
    response: Vec<SharedResponseInterceptor<ConfigResponse>>,
    service: ConfigService,
}

impl ServiceStack {
    fn new(base: ConfigService) -> Self {
        Self {
            service: base.clone(),
            base,
            request: Vec::new(),
            response: Vec::new(),
        }
    }

    fn rebuild(&mut self) {
        let mut service = self.base.clone();

        for interceptor in self.response.iter().cloned() {
            service = BoxCloneService::new(service.and_then(move |response: ConfigResponse| {
                let interceptor = interceptor.clone();
                async move { interceptor.intercept(response).await.map_err(BoxError::from) }
            }));
        }

        // Wrapped last-to-first so the first registered filter is outermost.
        for interceptor in self.request.iter().rev().cloned() {
            let filter = move |config: RequestConfig| {
                let interceptor = interceptor.clone();
                async move { interceptor.intercept(config).await.map_err(BoxError::from) }
            };
            service = BoxCloneService::new(AsyncFilter::new(service, filter));
        }

        self.service = service;
    }
}

pub struct TowerTransport {
    stack: Mutex<ServiceStack>,
}

impl TowerTransport {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_http_client(build_http_client_or_default(config, "tower"))
    }

    pub fn with_http_client(client: reqwest::Client) -> Self {
        let base = tower::service_fn(move |config: RequestConfig| {
            let client = client.clone();
            async move { send(&client, config).await.map_err(BoxError::from) }
        });
        Self::with_service(BoxCloneService::new(base))
    }

    /// Build on a custom base service, e.g. a recording double.
    pub fn with_service(base: ConfigService) -> Self {
        Self {
            stack: Mutex::new(ServiceStack::new(base)),
        }
    }

    pub fn request_interceptor_count(&self) -> usize {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).request.len()
    }

    pub fn response_interceptor_count(&self) -> usize {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).response.len()
    }

    fn service(&self) -> ConfigService {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .service
            .clone()
    }
}

#[async_trait]
impl InterceptingTransport for TowerTransport {
    fn use_request(&self, interceptor: SharedConfigInterceptor) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.request.push(interceptor);
        stack.rebuild();
        tracing::debug!(target: "switchyard::tower", total = stack.request.len(), "registered request layer");
    }

    fn use_response(&self, interceptor: SharedResponseInterceptor<ConfigResponse>) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.response.push(interceptor);
        stack.rebuild();
        tracing::debug!(target: "switchyard::tower", total = stack.response.len(), "registered response layer");
    }

    async fn request(&self, config: RequestConfig) -> TowerResult {
        self.service().oneshot(config).await.map_err(into_dispatch_error)
    }
}

/// Recover the typed failure from a service error.
pub fn into_dispatch_error(error: BoxError) -> DispatchError<ConfigResponse> {
    match error.downcast::<DispatchError<ConfigResponse>>() {
        Ok(dispatch) => *dispatch,
        Err(error) => match error.downcast::<HttpError>() {
            Ok(kind) => DispatchError::new(*kind),
            Err(other) => DispatchError::new(HttpError::Transport(other.to_string())),
        },
    }
}

async fn send(client: &reqwest::Client, config: RequestConfig) -> TowerResult {
    let url = config.full_url();
    let mut builder = client
        .request(config.method.into(), &url)
        .headers(config.headers.clone());
    if !config.params.is_empty() {
        builder = builder.query(&config.params);
    }
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(data) = &config.data {
        builder = builder.json(data);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| map_reqwest_error(&url, e))?;
    let buffered = buffer_response(response).await?;

    let response = ConfigResponse::new(
        buffered.status(),
        buffered.headers().clone(),
        decode_data(buffered.body()),
        config,
    );
    if !response.is_success() {
        let kind = HttpError::status(response.status.as_u16());
        return Err(DispatchError::with_response(kind, response));
    }
    Ok(response)
}
