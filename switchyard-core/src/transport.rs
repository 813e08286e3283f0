//! Transport capability seam.
//!
//! Each provider wraps one HTTP library behind this trait so the dispatch
//! algorithm never depends on a concrete client, and tests can substitute a
//! recording double.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;

/// Perform one HTTP call described by `url` plus the provider's request type.
///
/// Implementations that treat non-success statuses as failures attach the
/// response to the returned [`DispatchError`].
#[async_trait]
pub trait Transport<R, T>: Send + Sync {
    async fn dispatch(&self, url: String, request: R) -> Result<T, DispatchError<T>>;
}

pub type SharedTransport<R, T> = Arc<dyn Transport<R, T>>;
