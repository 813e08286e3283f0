//! Test doubles for provider crates.
//!
//! Enabled by the `test-support` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::pipeline::{Intercepted, SharedRequestInterceptor, SharedResponseInterceptor, request_fn, response_fn};
use crate::transport::Transport;

type Responder<R, T> = Box<dyn Fn(&str, &R) -> Result<T, DispatchError<T>> + Send + Sync>;

/// Transport that records every call and answers from a queue, falling back to
/// a responder closure once the queue is empty.
pub struct RecordingTransport<R, T> {
    calls: Mutex<Vec<(String, R)>>,
    queued: Mutex<VecDeque<Result<T, DispatchError<T>>>>,
    responder: Responder<R, T>,
}

impl<R, T> RecordingTransport<R, T> {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &R) -> Result<T, DispatchError<T>> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
        }
    }

    /// Always answer with a clone of `response`.
    pub fn returning(response: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::new(move |_, _| Ok(response.clone()))
    }

    /// Answer the next call with `result` before falling back to the responder.
    pub fn enqueue(&self, result: Result<T, DispatchError<T>>) -> &Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn calls(&self) -> Vec<(String, R)>
    where
        R: Clone,
    {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_call(&self) -> Option<(String, R)>
    where
        R: Clone,
    {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl<R, T> Transport<R, T> for RecordingTransport<R, T>
where
    R: Send + 'static,
    T: Send + 'static,
{
    async fn dispatch(&self, url: String, request: R) -> Result<T, DispatchError<T>> {
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let result = match queued {
            Some(result) => result,
            None => (self.responder)(&url, &request),
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url, request));
        result
    }
}

/// Shared call counter for asserting how often an interceptor ran.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// A pass-through request interceptor that bumps this counter.
    pub fn request_interceptor<R: Send + 'static>(&self) -> SharedRequestInterceptor<R> {
        let counter = self.clone();
        request_fn(move |url: String, request: R| {
            counter.increment();
            async move { Ok(Intercepted::new(url, request)) }
        })
    }

    /// A pass-through response interceptor that bumps this counter.
    pub fn response_interceptor<T: Send + 'static>(&self) -> SharedResponseInterceptor<T> {
        let counter = self.clone();
        response_fn(move |response: T| {
            counter.increment();
            async move { Ok(response) }
        })
    }
}
