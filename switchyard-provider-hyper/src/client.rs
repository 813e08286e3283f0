//! Fetch-style client.

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

use crate::transport::HyperTransport;
use crate::types::FetchOptions;

pub type HyperResult<T> = Result<T, DispatchError<HttpResponse>>;

/// Client with fetch semantics: a non-success status is a plain failure and
/// response interceptors only ever see successful responses.
pub struct HyperClient {
    transport: SharedTransport<FetchOptions, HttpResponse>,
    pipeline: InterceptorPipeline<FetchOptions, HttpResponse>,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperClient {
    /// The process-wide instance.
    pub fn instance() -> Arc<Self> {
        registry::global().get_or_init(ProviderKind::Hyper, Self::new)
    }

    /// A fresh client configured from the environment.
    pub fn new() -> Self {
        Self::with_config(&HttpConfig::from_env())
    }

    pub fn with_config(config: &HttpConfig) -> Self {
        Self::with_transport(Arc::new(HyperTransport::new(config)))
    }

    pub fn with_transport(transport: SharedTransport<FetchOptions, HttpResponse>) -> Self {
        Self {
            transport,
            pipeline: InterceptorPipeline::new(),
        }
    }

    pub fn register_request_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedRequestInterceptor<FetchOptions>>,
    {
        self.pipeline.register_request_interceptors(interceptors);
    }

    pub fn register_response_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedResponseInterceptor<HttpResponse>>,
    {
        self.pipeline.register_response_interceptors(interceptors);
    }

    pub fn pipeline(&self) -> &InterceptorPipeline<FetchOptions, HttpResponse> {
        &self.pipeline
    }

    pub async fn get(
        &self,
        url: &str,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        self.fetch(Method::Get, url, None, options, schema).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        let body = serde_json::to_string(body).map_err(HttpError::from)?;
        self.fetch(Method::Post, url, Some(body), options, schema).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        let body = serde_json::to_string(body).map_err(HttpError::from)?;
        self.fetch(Method::Put, url, Some(body), options, schema).await
    }

    pub async fn delete(
        &self,
        url: &str,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        self.fetch(Method::Delete, url, None, options, schema).await
    }

    /// Dispatch with a method token. Unknown tokens fail before any
    /// interceptor runs; a body given with GET or DELETE is dropped.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<Value>,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        let method: Method = method.parse()?;
        let body = match body {
            Some(body) if method.carries_body() => {
                Some(serde_json::to_string(&body).map_err(HttpError::from)?)
            }
            _ => None,
        };
        self.fetch(method, url, body, options, schema).await
    }

    async fn fetch(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        options: Option<FetchOptions>,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        let base = FetchOptions {
            method: Some(method),
            body,
            ..FetchOptions::default()
        };
        let options = match options {
            Some(caller) => base.merge(caller),
            None => base,
        };

        let span = dispatch_span(ProviderKind::Hyper, method, url);
        self.execute(url.to_string(), options, schema)
            .instrument(span)
            .await
            .inspect_err(|e| {
                tracing::error!(target: "switchyard::hyper", error = %e, "Fetch operation failed");
            })
    }

    async fn execute(
        &self,
        url: String,
        options: FetchOptions,
        schema: Option<SharedSchema>,
    ) -> HyperResult<HttpResponse> {
        let Intercepted { url, request } = self
            .pipeline
            .apply_request_interceptors(url, options)
            .await?;

        tracing::debug!(target: "switchyard::hyper", url = %url, "sending request");
        let response = self.transport.dispatch(url, request).await?;

        if !response.is_success() {
            return Err(HttpError::status(response.status().as_u16()).into());
        }

        if let Some(schema) = schema {
            spawn_body_validation(schema, response.body());
        }

        Ok(self.pipeline.apply_response_interceptors(response).await?)
    }
}
