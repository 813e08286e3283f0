//! `reqwest` transport.

use async_trait::async_trait;
use switchyard_core::{DispatchError, HttpConfig, HttpError, HttpResponse, Result, Transport};

use crate::types::RequestOptions;

/// Build a `reqwest::Client` from `HttpConfig`.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| HttpError::Configuration(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if !config.headers.is_empty() {
        builder = builder.default_headers(config.default_headers()?);
    }

    builder
        .build()
        .map_err(|e| HttpError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// [`build_http_client`], tolerating a rejected configuration.
///
/// An unusable proxy is dropped and the remaining settings are kept; only when
/// that still fails does a default client take over.
pub fn build_http_client_or_default(config: &HttpConfig, provider: &'static str) -> reqwest::Client {
    let error = match build_http_client(config) {
        Ok(client) => return client,
        Err(e) => e,
    };

    if config.proxy.is_some() {
        let without_proxy = HttpConfig {
            proxy: None,
            ..config.clone()
        };
        if let Ok(client) = build_http_client(&without_proxy) {
            tracing::warn!(target: "switchyard::reqwest", provider, error = %error, "ignoring proxy setting");
            return client;
        }
    }

    tracing::warn!(target: "switchyard::reqwest", provider, error = %error, "falling back to a default HTTP client");
    reqwest::Client::new()
}

/// Map a `reqwest` failure onto the shared error kinds.
pub fn map_reqwest_error(url: &str, e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(e.to_string())
    } else if e.is_builder() {
        HttpError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        HttpError::Transport(e.to_string())
    }
}

/// Buffer a `reqwest` response into [`HttpResponse`].
pub async fn buffer_response(response: reqwest::Response) -> Result<HttpResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let url = response.url().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(&url, e))?;
    Ok(HttpResponse::new(status, headers, url, body))
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_client(build_http_client_or_default(config, "reqwest"))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_request(&self, url: &str, options: &RequestOptions) -> reqwest::RequestBuilder {
        let method = options.method.unwrap_or_default();
        let mut builder = self.client.request(method.into(), options.resolve_url(url));

        if let Some(headers) = &options.headers {
            builder = builder.headers(headers.clone());
        }
        if let Some(params) = &options.search_params {
            builder = builder.query(params);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(json) = &options.json {
            builder = builder.json(json);
        } else if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }
        builder
    }
}

#[async_trait]
impl Transport<RequestOptions, HttpResponse> for ReqwestTransport {
    async fn dispatch(
        &self,
        url: String,
        options: RequestOptions,
    ) -> std::result::Result<HttpResponse, DispatchError<HttpResponse>> {
        let response = self
            .build_request(&url, &options)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&url, e))?;
        let response = buffer_response(response).await?;

        if options.throws_http_errors() && !response.is_success() {
            let kind = HttpError::status(response.status().as_u16());
            return Err(DispatchError::with_response(kind, response));
        }
        Ok(response)
    }
}
