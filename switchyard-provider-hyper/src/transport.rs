//! `hyper-util` transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use http::{Request, Response, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use switchyard_core::headers::merge_headers;
use switchyard_core::{DispatchError, HttpConfig, HttpError, HttpResponse, Result, Transport};

use crate::types::FetchOptions;

const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";

/// Plain-HTTP transport on the `hyper-util` legacy client.
///
/// Responses of any status are returned as `Ok`; the client decides what a
/// non-success status means.
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    default_headers: HeaderMap,
    user_agent: Option<HeaderValue>,
    timeout: Option<Duration>,
}

impl HyperTransport {
    pub fn new(config: &HttpConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.connect_timeout);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        if let Some(proxy) = &config.proxy {
            tracing::warn!(target: "switchyard::hyper", proxy = %proxy, "proxy configuration is not supported by the hyper transport, ignoring");
        }

        let user_agent = config.user_agent.as_deref().and_then(|ua| {
            HeaderValue::from_str(ua)
                .inspect_err(|e| {
                    tracing::warn!(target: "switchyard::hyper", error = %e, "ignoring invalid user agent");
                })
                .ok()
        });

        Self {
            client,
            default_headers: config.default_headers_lossy(),
            user_agent,
            timeout: config.timeout,
        }
    }

    fn build_request(&self, url: &str, options: FetchOptions) -> Result<Request<Full<Bytes>>> {
        let uri = parse_uri(url)?;

        let mut headers = match &options.headers {
            Some(extra) => merge_headers(&self.default_headers, extra),
            None => self.default_headers.clone(),
        };
        if let Some(user_agent) = &self.user_agent {
            headers.entry(USER_AGENT).or_insert_with(|| user_agent.clone());
        }

        let body = match options.body {
            Some(body) => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(TEXT_PLAIN_UTF8));
                Bytes::from(body)
            }
            None => Bytes::new(),
        };

        let mut request = Request::new(Full::new(body));
        *request.method_mut() = options.method.unwrap_or_default().into();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }

    async fn send(&self, url: String, request: Request<Full<Bytes>>) -> Result<HttpResponse> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(map_client_error)?;
        read_response(response, url).await
    }
}

fn parse_uri(url: &str) -> Result<Uri> {
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| HttpError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match uri.scheme_str() {
        Some("http") => Ok(uri),
        Some(other) => Err(HttpError::InvalidUrl {
            url: url.to_string(),
            message: format!("scheme '{other}' is not supported by the hyper transport"),
        }),
        None => Err(HttpError::InvalidUrl {
            url: url.to_string(),
            message: "absolute http:// URL required".to_string(),
        }),
    }
}

fn map_client_error(e: hyper_util::client::legacy::Error) -> HttpError {
    let detail = match std::error::Error::source(&e) {
        Some(source) => format!("{e}: {source}"),
        None => e.to_string(),
    };
    HttpError::Transport(detail)
}

async fn read_response(response: Response<Incoming>, url: String) -> Result<HttpResponse> {
    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| HttpError::Transport(format!("Failed to read response body: {e}")))?
        .to_bytes();
    Ok(HttpResponse::new(parts.status, parts.headers, url, body))
}

#[async_trait]
impl Transport<FetchOptions, HttpResponse> for HyperTransport {
    async fn dispatch(
        &self,
        url: String,
        options: FetchOptions,
    ) -> std::result::Result<HttpResponse, DispatchError<HttpResponse>> {
        let timeout = options.timeout.or(self.timeout);
        let request = self.build_request(&url, options)?;

        let response = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(url, request))
                .await
                .map_err(|_| HttpError::Timeout(format!("no response within {limit:?}")))??,
            None => self.send(url, request).await?,
        };
        Ok(response)
    }
}
