//! Builder-object client.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use switchyard_core::registry::{self, ProviderKind};
use switchyard_core::transport::SharedTransport;
use switchyard_core::{
    DispatchError, HttpConfig, HttpError, Intercepted, InterceptorPipeline, Method,
    SharedRequestInterceptor, SharedResponseInterceptor, SharedSchema, dispatch_span,
    spawn_validation,
};
use tracing::Instrument;

use crate::transport::{UreqTransport, validation_value};
use crate::types::{AgentOptions, AgentRequest, AgentResponse};

pub type UreqResult<T> = Result<T, DispatchError<AgentResponse>>;

/// Client whose request interceptors receive and return an [`AgentRequest`]
/// builder.
///
/// The JSON body is attached after the request interceptors have run.
/// Failures carrying a response (non-success statuses) have that response
/// routed through the response interceptors.
pub struct UreqClient {
    transport: SharedTransport<AgentRequest, AgentResponse>,
    pipeline: InterceptorPipeline<AgentRequest, AgentResponse>,
}

impl std::fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqClient")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqClient {
    pub fn instance() -> Arc<Self> {
        registry::global().get_or_init(ProviderKind::Ureq, Self::new)
    }

    pub fn new() -> Self {
        Self::with_config(&HttpConfig::from_env())
    }

    pub fn with_config(config: &HttpConfig) -> Self {
        Self::with_transport(Arc::new(UreqTransport::new(config)))
    }

    pub fn with_transport(transport: SharedTransport<AgentRequest, AgentResponse>) -> Self {
        Self {
            transport,
            pipeline: InterceptorPipeline::new(),
        }
    }

    pub fn register_request_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedRequestInterceptor<AgentRequest>>,
    {
        self.pipeline.register_request_interceptors(interceptors);
    }

    pub fn register_response_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedResponseInterceptor<AgentResponse>>,
    {
        self.pipeline.register_response_interceptors(interceptors);
    }

    pub fn pipeline(&self) -> &InterceptorPipeline<AgentRequest, AgentResponse> {
        &self.pipeline
    }

    pub async fn get(
        &self,
        url: &str,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        self.send_request(Method::Get, url, None, options, schema).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send_request(Method::Post, url, Some(body), options, schema)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        self.send_request(Method::Put, url, Some(body), options, schema)
            .await
    }

    pub async fn delete(
        &self,
        url: &str,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        self.send_request(Method::Delete, url, None, options, schema)
            .await
    }

    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<Value>,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        let method: Method = method.parse()?;
        self.send_request(method, url, body, options, schema).await
    }

    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: Option<AgentOptions>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        let request = AgentRequest::new(method);
        let request = match options {
            Some(options) => options.apply(request),
            None => request,
        };

        let span = dispatch_span(ProviderKind::Ureq, method, url);
        async {
            match self.execute(url.to_string(), request, body, schema).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    tracing::error!(target: "switchyard::ureq", error = %error, status = ?error.status(), "Request failed");
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
        request: AgentRequest,
        body: Option<Value>,
        schema: Option<SharedSchema>,
    ) -> UreqResult<AgentResponse> {
        let Intercepted { url, request } = self
            .pipeline
            .apply_request_interceptors(url, request)
            .await?;

        let request = match body {
            Some(body) if !body.is_null() && request.method().carries_body() => request.send(body),
            _ => request,
        };

        tracing::debug!(target: "switchyard::ureq", url = %url, "sending request");
        let response = self.transport.dispatch(url, request).await?;

        if let Some(schema) = schema {
            match validation_value(&response) {
                Some(value) => {
                    spawn_validation(schema, value);
                }
                None => {
                    tracing::error!(target: "switchyard::ureq", "Error parsing JSON response, skipping schema validation");
                }
            }
        }

        Ok(self.pipeline.apply_response_interceptors(response).await?)
    }
}
