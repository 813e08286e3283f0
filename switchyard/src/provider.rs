//! Provider selection by name.
//!
//! ```rust,ignore
//! use switchyard::provider::get_client;
//!
//! let client = get_client("reqwest")?;
//! let reqwest = client.as_reqwest().expect("reqwest client");
//! ```

use std::sync::Arc;

use switchyard_core::registry::{self, ProviderKind};
use switchyard_core::{HttpError, Result};
use switchyard_provider_hyper::HyperClient;
use switchyard_provider_reqwest::ReqwestClient;
use switchyard_provider_tower::TowerClient;
use switchyard_provider_ureq::UreqClient;

/// The process-wide client of one provider.
#[derive(Debug, Clone)]
pub enum HttpClient {
    Hyper(Arc<HyperClient>),
    Reqwest(Arc<ReqwestClient>),
    Ureq(Arc<UreqClient>),
    Tower(Arc<TowerClient>),
}

impl HttpClient {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Hyper(_) => ProviderKind::Hyper,
            Self::Reqwest(_) => ProviderKind::Reqwest,
            Self::Ureq(_) => ProviderKind::Ureq,
            Self::Tower(_) => ProviderKind::Tower,
        }
    }

    pub fn as_hyper(&self) -> Option<&Arc<HyperClient>> {
        match self {
            Self::Hyper(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_reqwest(&self) -> Option<&Arc<ReqwestClient>> {
        match self {
            Self::Reqwest(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_ureq(&self) -> Option<&Arc<UreqClient>> {
        match self {
            Self::Ureq(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_tower(&self) -> Option<&Arc<TowerClient>> {
        match self {
            Self::Tower(client) => Some(client),
            _ => None,
        }
    }
}

/// Look up the singleton for `name` (`hyper`, `reqwest`, `ureq` or `tower`).
///
/// Names are trimmed and matched case-insensitively.
pub fn get_client(name: &str) -> Result<HttpClient> {
    let kind: ProviderKind = name.parse()?;
    tracing::debug!(target: "switchyard::registry", provider = %kind, "selecting client");
    Ok(client_for(kind))
}

pub fn client_for(kind: ProviderKind) -> HttpClient {
    match kind {
        ProviderKind::Hyper => HttpClient::Hyper(HyperClient::instance()),
        ProviderKind::Reqwest => HttpClient::Reqwest(ReqwestClient::instance()),
        ProviderKind::Ureq => HttpClient::Ureq(UreqClient::instance()),
        ProviderKind::Tower => HttpClient::Tower(TowerClient::instance()),
    }
}

/// Drop every singleton; the next access builds fresh clients with empty
/// interceptor sequences.
pub fn reset_clients() {
    registry::global().clear();
}

impl std::str::FromStr for HttpClient {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self> {
        get_client(s)
    }
}
