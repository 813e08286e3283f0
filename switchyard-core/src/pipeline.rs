//! Interceptor pipeline
//!
//! The ordered chains every provider threads its requests and responses through.
//!
//! - Request interceptors receive `(url, request)` and return an
//!   [`Intercepted`] pair. The returned URL replaces the previous one; the
//!   returned request is folded onto the previous request with [`Merge`], so
//!   option types can implement shallow-merge semantics while builder objects
//!   implement plain replacement.
//! - Response interceptors receive a response and return the response that
//!   every later interceptor (and finally the caller) sees.
//!
//! Both chains run strictly in registration order, one interceptor at a time.
//! Synchronous interceptors are wrapped with [`map_request`] / [`map_response`];
//! async closures and custom types implement the traits directly.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{DispatchError, Result};
use crate::method::Method;
use crate::registry::ProviderKind;

/// A URL together with the provider-specific request description.
#[derive(Debug, Clone, PartialEq)]
pub struct Intercepted<R> {
    pub url: String,
    pub request: R,
}

impl<R> Intercepted<R> {
    pub fn new(url: impl Into<String>, request: R) -> Self {
        Self {
            url: url.into(),
            request,
        }
    }
}

/// How an interceptor's returned request is folded onto the prior one.
pub trait Merge {
    /// Combine `self` (the request before the interceptor ran) with `incoming`
    /// (what the interceptor returned).
    fn merge(self, incoming: Self) -> Self;
}

#[async_trait]
pub trait RequestInterceptor<R>: Send + Sync {
    async fn intercept(&self, url: String, request: R) -> Result<Intercepted<R>>;
}

#[async_trait]
pub trait ResponseInterceptor<T>: Send + Sync {
    async fn intercept(&self, response: T) -> Result<T>;
}

pub type SharedRequestInterceptor<R> = Arc<dyn RequestInterceptor<R>>;
pub type SharedResponseInterceptor<T> = Arc<dyn ResponseInterceptor<T>>;

#[async_trait]
impl<R, F, Fut> RequestInterceptor<R> for F
where
    R: Send + 'static,
    F: Fn(String, R) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Intercepted<R>>> + Send + 'static,
{
    async fn intercept(&self, url: String, request: R) -> Result<Intercepted<R>> {
        (self)(url, request).await
    }
}

#[async_trait]
impl<T, F, Fut> ResponseInterceptor<T> for F
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    async fn intercept(&self, response: T) -> Result<T> {
        (self)(response).await
    }
}

/// Synchronous request interceptor adapter, see [`map_request`].
pub struct MapRequest<F>(F);

#[async_trait]
impl<R, F> RequestInterceptor<R> for MapRequest<F>
where
    R: Send + 'static,
    F: Fn(String, R) -> Result<Intercepted<R>> + Send + Sync,
{
    async fn intercept(&self, url: String, request: R) -> Result<Intercepted<R>> {
        (self.0)(url, request)
    }
}

/// Synchronous response interceptor adapter, see [`map_response`].
pub struct MapResponse<F>(F);

#[async_trait]
impl<T, F> ResponseInterceptor<T> for MapResponse<F>
where
    T: Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync,
{
    async fn intercept(&self, response: T) -> Result<T> {
        (self.0)(response)
    }
}

/// Wrap a synchronous request transform.
pub fn map_request<R, F>(f: F) -> SharedRequestInterceptor<R>
where
    R: Send + 'static,
    F: Fn(String, R) -> Result<Intercepted<R>> + Send + Sync + 'static,
{
    Arc::new(MapRequest(f))
}

/// Wrap an asynchronous request transform.
pub fn request_fn<R, F, Fut>(f: F) -> SharedRequestInterceptor<R>
where
    R: Send + 'static,
    F: Fn(String, R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Intercepted<R>>> + Send + 'static,
{
    Arc::new(f)
}

/// Wrap a synchronous response transform.
pub fn map_response<T, F>(f: F) -> SharedResponseInterceptor<T>
where
    T: Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(MapResponse(f))
}

/// Wrap an asynchronous response transform.
pub fn response_fn<T, F, Fut>(f: F) -> SharedResponseInterceptor<T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(f)
}

/// Ordered request and response interceptor chains.
///
/// Registration appends; there is no removal. Each fold works on a snapshot of
/// the chain taken when the fold starts, so no lock is held across an await.
/// Registering while calls are in flight is allowed but the ordering relative
/// to those calls is up to the caller.
pub struct InterceptorPipeline<R, T> {
    request: RwLock<Vec<SharedRequestInterceptor<R>>>,
    response: RwLock<Vec<SharedResponseInterceptor<T>>>,
}

impl<R, T> Default for InterceptorPipeline<R, T> {
    fn default() -> Self {
        Self {
            request: RwLock::new(Vec::new()),
            response: RwLock::new(Vec::new()),
        }
    }
}

impl<R, T> std::fmt::Debug for InterceptorPipeline<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorPipeline")
            .field("request_interceptors", &self.request_interceptor_count())
            .field("response_interceptors", &self.response_interceptor_count())
            .finish()
    }
}

impl<R, T> InterceptorPipeline<R, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append request interceptors, keeping the iteration order.
    pub fn register_request_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedRequestInterceptor<R>>,
    {
        let mut chain = self.request.write().unwrap_or_else(PoisonError::into_inner);
        let before = chain.len();
        chain.extend(interceptors);
        tracing::debug!(target: "switchyard::pipeline", added = chain.len() - before, total = chain.len(), "registered request interceptors");
    }

    /// Append response interceptors, keeping the iteration order.
    pub fn register_response_interceptors<I>(&self, interceptors: I)
    where
        I: IntoIterator<Item = SharedResponseInterceptor<T>>,
    {
        let mut chain = self.response.write().unwrap_or_else(PoisonError::into_inner);
        let before = chain.len();
        chain.extend(interceptors);
        tracing::debug!(target: "switchyard::pipeline", added = chain.len() - before, total = chain.len(), "registered response interceptors");
    }

    pub fn request_interceptor_count(&self) -> usize {
        self.request.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn response_interceptor_count(&self) -> usize {
        self.response.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn request_chain(&self) -> Vec<SharedRequestInterceptor<R>> {
        self.request.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn response_chain(&self) -> Vec<SharedResponseInterceptor<T>> {
        self.response.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<R, T> InterceptorPipeline<R, T>
where
    R: Merge + Clone + Send + 'static,
    T: Send + 'static,
{
    /// Fold the request chain over `(url, request)`.
    ///
    /// The first failing interceptor aborts the fold; later interceptors do
    /// not run.
    pub async fn apply_request_interceptors(
        &self,
        url: String,
        request: R,
    ) -> Result<Intercepted<R>> {
        let chain = self.request_chain();
        let mut current = Intercepted::new(url, request);

        for (index, interceptor) in chain.iter().enumerate() {
            let prior = current.request.clone();
            let Intercepted { url, request } = interceptor
                .intercept(current.url, current.request)
                .await
                .inspect_err(|e| {
                    tracing::debug!(target: "switchyard::pipeline", index, error = %e, "request interceptor failed");
                })?;
            tracing::trace!(target: "switchyard::pipeline", index, url = %url, "request interceptor applied");
            current = Intercepted {
                url,
                request: prior.merge(request),
            };
        }

        Ok(current)
    }

    /// Fold the response chain over `response`.
    pub async fn apply_response_interceptors(&self, response: T) -> Result<T> {
        let chain = self.response_chain();
        let mut current = response;

        for (index, interceptor) in chain.iter().enumerate() {
            current = interceptor.intercept(current).await.inspect_err(|e| {
                tracing::debug!(target: "switchyard::pipeline", index, error = %e, "response interceptor failed");
            })?;
            tracing::trace!(target: "switchyard::pipeline", index, "response interceptor applied");
        }

        Ok(current)
    }

    /// Route the response embedded in a failure through the response chain.
    ///
    /// If the chain fails, the interceptor error is logged and the original
    /// embedded response is kept. The failure itself is always returned.
    pub async fn recover_error_response(&self, mut error: DispatchError<T>) -> DispatchError<T>
    where
        T: Clone,
    {
        if self.response_interceptor_count() == 0 {
            return error;
        }
        let Some(original) = error.take_response() else {
            return error;
        };

        match self.apply_response_interceptors(original.clone()).await {
            Ok(intercepted) => error.set_response(intercepted),
            Err(interceptor_error) => {
                tracing::warn!(target: "switchyard::pipeline", error = %interceptor_error, "Error in response interceptor, keeping original error response");
                error.set_response(original);
            }
        }

        error
    }
}

/// Span wrapping one dispatch; `request_id` correlates the log lines of a call.
pub fn dispatch_span(provider: ProviderKind, method: Method, url: &str) -> tracing::Span {
    tracing::debug_span!(
        target: "switchyard::dispatch",
        "dispatch",
        provider = provider.as_str(),
        method = method.as_str(),
        url = %url,
        request_id = %uuid::Uuid::new_v4(),
    )
}
