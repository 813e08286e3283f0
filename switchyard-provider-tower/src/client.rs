//! Config-object client backed by a tower service stack.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use switchyard_core::registry::{self, ProviderKind};
use switchyard_core::{
    DispatchError, HttpConfig, HttpError, Method, SharedResponseInterceptor, SharedSchema,
    dispatch_span, spawn_validation,
};
use tracing::Instrument;

use crate::transport::{InterceptingTransport, TowerTransport};
use crate::types::{ConfigResponse, RequestConfig, SharedConfigInterceptor};

pub type TowerClientResult<T> = Result<T, DispatchError<ConfigResponse>>;

/// Client whose interceptors are layers of the transport itself.
///
/// Request interceptors see the whole [`RequestConfig`], URL included.
/// A non-success status fails with the response attached; response
/// interceptors are not applied to it.
pub struct TowerClient {
    transport: Arc<dyn InterceptingTransport>,
}

impl std::fmt::Debug for TowerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TowerClient").finish_non_exhaustive()
    }
}

impl Default for TowerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerClient {
    pub fn instance() -> Arc<Self> {
        registry::global().get_or_init(ProviderKind::Tower, Self::new)
    }

    pub fn new() -> Self {
        Self::with_config(&HttpConfig::from_env())
    }

    pub fn with_config(config: &HttpConfig) -> Self {
        Self::with_transport(Arc::new(TowerTransport::new(config)))
    }

    pub fn with_transport(transport: Arc<dyn InterceptingTransport>) -> Self {
        Self { transport }
    }

    /// Each interceptor is installed as a layer, in iteration order.
    pub fn register_request_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedConfigInterceptor>,
    {
        for interceptor in interceptors {
            self.transport.use_request(interceptor);
        }
    }

    pub fn register_response_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedResponseInterceptor<ConfigResponse>>,
    {
        for interceptor in interceptors {
            self.transport.use_response(interceptor);
        }
    }

    pub async fn get(
        &self,
        url: &str,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        self.send_request(Method::Get, url, None, config, schema).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send_request(Method::Post, url, Some(body), config, schema)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send_request(Method::Put, url, Some(body), config, schema)
            .await
    }

    pub async fn delete(
        &self,
        url: &str,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        self.send_request(Method::Delete, url, None, config, schema)
            .await
    }

    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        let method: Method = method.parse()?;
        self.send_request(method, url, body, config, schema).await
    }

    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
        schema: Option<SharedSchema>,
    ) -> TowerClientResult<ConfigResponse> {
        let config = RequestConfig {
            method,
            url: url.to_string(),
            data: body.filter(|_| method.carries_body()),
            ..config.unwrap_or_default()
        };

        let span = dispatch_span(ProviderKind::Tower, method, url);
        async {
            tracing::debug!(target: "switchyard::tower", "sending request");
            match self.transport.request(config).await {
                Ok(response) => {
                    if let Some(schema) = schema {
                        spawn_validation(schema, response.data.clone());
                    }
                    Ok(response)
                }
                Err(error) => {
                    tracing::error!(target: "switchyard::tower", error = %error, status = ?error.status(), "Request failed");
                    Err(error)
                }
            }
        }
        .instrument(span)
        .await
    }
}
