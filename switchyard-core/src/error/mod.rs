//! Error Handling Module
//!
//! - `HttpError`: every failure kind a switchyard call can signal
//! - `DispatchError`: the failure value returned by adapter calls, optionally
//!   carrying the response the transport attached to it
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_core::error::{DispatchError, HttpError};
//!
//! let error: DispatchError<()> = HttpError::UnsupportedMethod("PATCH".into()).into();
//! assert!(error.response().is_none());
//! ```

mod conversions;
mod dispatch;
pub mod types;

pub use dispatch::DispatchError;
pub use types::*;

/// Result alias used across the workspace.
pub type Result<T, E = HttpError> = std::result::Result<T, E>;
