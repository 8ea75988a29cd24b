//! Transport port for sending HTTP requests.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::error::VcrError;

/// An outbound HTTP request with a fully buffered body.
pub type HttpRequest = http::Request<Bytes>;

/// An HTTP response with a fully buffered body.
pub type HttpResponse = http::Response<Bytes>;

/// Boxed future type alias used by [`Transport`] to keep the trait dyn-compatible.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, VcrError>> + Send + 'a>>;

/// Sends HTTP requests somewhere and returns the response.
///
/// Non-2xx statuses are successful sends; only transport-level failures are errors.
pub trait Transport: Send + Sync {
    /// Sends `request`, giving up early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::Transport`] when the call fails and
    /// [`VcrError::Cancelled`] when `cancel` fires first.
    fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_>;
}
