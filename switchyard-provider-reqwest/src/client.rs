//! Hook-based client.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use switchyard_core::registry::{self, ProviderKind};
use switchyard_core::transport::SharedTransport;
use switchyard_core::{
    DispatchError, HttpConfig, HttpError, HttpResponse, Intercepted, InterceptorPipeline, Merge,
    Method, SharedRequestInterceptor, SharedResponseInterceptor, SharedSchema, dispatch_span,
    spawn_body_validation,
};
use tracing::Instrument;

use crate::transport::ReqwestTransport;
use crate::types::RequestOptions;

pub type ReqwestResult<T> = Result<T, DispatchError<HttpResponse>>;

/// Client that reports non-success statuses as failures carrying the
/// response. That response goes through the response interceptors before the
/// failure reaches the caller.
pub struct ReqwestClient {
    transport: SharedTransport<RequestOptions, HttpResponse>,
    pipeline: InterceptorPipeline<RequestOptions, HttpResponse>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestClient {
    pub fn instance() -> Arc<Self> {
        registry::global().get_or_init(ProviderKind::Reqwest, Self::new)
    }

    pub fn new() -> Self {
        Self::with_config(&HttpConfig::from_env())
    }

    pub fn with_config(config: &HttpConfig) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new(config)))
    }

    /// Use an existing `reqwest::Client`.
    pub fn with_http_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::with_client(client)))
    }

    pub fn with_transport(transport: SharedTransport<RequestOptions, HttpResponse>) -> Self {
        Self {
            transport,
            pipeline: InterceptorPipeline::new(),
        }
    }

    pub fn register_request_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedRequestInterceptor<RequestOptions>>,
    {
        self.pipeline.register_request_interceptors(interceptors);
    }

    pub fn register_response_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedResponseInterceptor<HttpResponse>>,
    {
        self.pipeline.register_response_interceptors(interceptors);
    }

    pub fn pipeline(&self) -> &InterceptorPipeline<RequestOptions, HttpResponse> {
        &self.pipeline
    }

    pub async fn get(
        &self,
        url: &str,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        self.send(Method::Get, url, None, options, schema).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send(Method::Post, url, Some(body), options, schema).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send(Method::Put, url, Some(body), options, schema).await
    }

    pub async fn delete(
        &self,
        url: &str,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        self.send(Method::Delete, url, None, options, schema).await
    }

    /// Dispatch with a method token. The body is sent as JSON for POST and PUT
    /// only.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<Value>,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        let method: Method = method.parse()?;
        self.send(method, url, body, options, schema).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: Option<RequestOptions>,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        let base = RequestOptions::new().with_method(method);
        let mut options = match options {
            Some(caller) => base.merge(caller),
            None => base,
        };
        if let Some(body) = body.filter(|b| !b.is_null() && method.carries_body()) {
            options.json = Some(body);
        }

        let span = dispatch_span(ProviderKind::Reqwest, method, url);
        async {
            match self.execute(url.to_string(), options, schema).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    tracing::error!(target: "switchyard::reqwest", error = %error, status = ?error.status(), "Request failed");
                    Err(self.pipeline.recover_error_response(error).await)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        url: String,
        options: RequestOptions,
        schema: Option<SharedSchema>,
    ) -> ReqwestResult<HttpResponse> {
        let Intercepted { url, request } = self
            .pipeline
            .apply_request_interceptors(url, options)
            .await?;

        tracing::debug!(target: "switchyard::reqwest", url = %url, "sending request");
        let response = self.transport.dispatch(url, request).await?;

        if let Some(schema) = schema {
            spawn_body_validation(schema, response.body());
        }

        Ok(self.pipeline.apply_response_interceptors(response).await?)
    }
}
