//! Unified error type.

use std::fmt;
use std::time::Duration;

/// Boxed, type-erased failure raised inside application middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type carried by the router's `Errored` rendering state.
///
/// Control-flow outcomes are not errors: an unmatched path is the `NotFound`
/// state, and a guard that halts the chain to redirect is a deliberate
/// decision. `Error` surfaces what the middleware chain could not recover
/// from: a timed-out navigation, a failed data loader, or any other failure
/// a middleware raised.
#[derive(Debug)]
pub enum Error {
    /// The remaining chain lost its race against a timeout middleware.
    Timeout {
        /// Path of the navigation that timed out.
        path: String,
        /// The configured time limit.
        limit: Duration,
    },
    /// A data-loading middleware failed.
    Load(BoxError),
    /// Any other failure raised inside a middleware.
    Middleware(BoxError),
}

impl Error {
    /// Wraps an arbitrary failure raised by application middleware.
    pub fn middleware(err: impl Into<BoxError>) -> Self {
        Self::Middleware(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { path, limit } => {
                write!(f, "navigation to `{path}` timed out after {limit:?}")
            }
            Self::Load(e) => write!(f, "data loader failed: {e}"),
            Self::Middleware(e) => write!(f, "middleware failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Load(e) | Self::Middleware(e) => Some(&**e),
        }
    }
}
