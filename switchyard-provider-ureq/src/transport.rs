//! `ureq` transport. Calls run on tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchyard_core::headers::header_pairs;
use switchyard_core::{DispatchError, HttpConfig, HttpError, Transport};

use crate::types::{AgentRequest, AgentResponse};

type UreqResult = Result<AgentResponse, DispatchError<AgentResponse>>;

pub struct UreqTransport {
    agent: ureq::Agent,
    default_headers: Arc<Vec<(String, String)>>,
}

impl UreqTransport {
    pub fn new(config: &HttpConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();

        if let Some(timeout) = config.connect_timeout {
            builder = builder.timeout_connect(timeout);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy_url) = &config.proxy {
            match ureq::Proxy::new(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => {
                    tracing::warn!(target: "switchyard::ureq", proxy = %proxy_url, error = %e, "ignoring invalid proxy URL");
                }
            }
        }

        Self {
            agent: builder.build(),
            default_headers: Arc::new(header_pairs(&config.default_headers_lossy())),
        }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            default_headers: Arc::new(Vec::new()),
        }
    }
}

fn map_transport_error(url: &str, transport: ureq::Transport) -> HttpError {
    match transport.kind() {
        ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => HttpError::InvalidUrl {
            url: url.to_string(),
            message: transport.to_string(),
        },
        ureq::ErrorKind::Io if is_timeout(&transport) => HttpError::Timeout(transport.to_string()),
        _ => HttpError::Transport(transport.to_string()),
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
}

fn read_response(response: ureq::Response) -> Result<AgentResponse, HttpError> {
    let status = response.status();
    let status_text = response.status_text().to_string();
    let url = response.get_url().to_string();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    let text = response
        .into_string()
        .map_err(|e| HttpError::Transport(format!("Failed to read response body: {e}")))?;
    Ok(AgentResponse::new(status, status_text, headers, url, text))
}

fn call_blocking(
    agent: &ureq::Agent,
    default_headers: &[(String, String)],
    url: &str,
    request: AgentRequest,
) -> UreqResult {
    let mut call = agent.request(request.method().as_str(), url);
    for (name, value) in default_headers.iter().chain(request.headers()) {
        call = call.set(name, value);
    }
    for (key, value) in request.query_pairs() {
        call = call.query(key, value);
    }
    if let Some(timeout) = request.request_timeout() {
        call = call.timeout(timeout);
    }

    let result = match (request.form_fields(), request.json_body()) {
        ([], None) => call.call(),
        ([], Some(json)) => call.send_json(json),
        (fields, None) => {
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            call.send_form(&pairs)
        }
        (_, Some(_)) => {
            return Err(HttpError::Configuration(
                "form fields and a JSON body cannot be sent together".to_string(),
            )
            .into());
        }
    };

    match result {
        Ok(response) => Ok(read_response(response)?),
        Err(ureq::Error::Status(code, response)) => {
            let response = read_response(response)?;
            Err(DispatchError::with_response(HttpError::status(code), response))
        }
        Err(ureq::Error::Transport(transport)) => Err(map_transport_error(url, transport).into()),
    }
}

#[async_trait]
impl Transport<AgentRequest, AgentResponse> for UreqTransport {
    async fn dispatch(&self, url: String, request: AgentRequest) -> UreqResult {
        let agent = self.agent.clone();
        let default_headers = self.default_headers.clone();

        tokio::task::spawn_blocking(move || call_blocking(&agent, &default_headers, &url, request))
            .await
            .map_err(|e| HttpError::Transport(format!("blocking request task failed: {e}")))?
    }
}

/// JSON value a schema should see for a response body.
pub(crate) fn validation_value(response: &AgentResponse) -> Option<Value> {
    match response.body() {
        Value::Null => serde_json::from_str(response.text()).ok(),
        body => Some(body.clone()),
    }
}
