//! Transports, the seam between the dispatcher and the network.
//!
//! A [`Transport`] turns one [`Request`] into one [`Response`]. The dispatcher
//! cancels a call by dropping the future returned from [`Transport::send`], so
//! implementations must release their connection when dropped mid-flight.
//!
//! - [`TcpTransport`]: HTTP/1.1 over a plain Tokio `TcpStream` (`http://` only).
//! - `ReqwestTransport`: TLS-capable transport backed by `reqwest`
//!   (cargo feature `reqwest`).

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::http::{Request, Response, ResponseError};

pub mod tcp;

#[cfg(feature = "reqwest")]
pub mod reqwest_transport;

pub use tcp::TcpTransport;

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

/// Heap-allocated, sendable future returned by [`Transport::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors a transport can report. The dispatcher logs them and then collapses
/// every variant into the same failure envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("malformed response: {0}")]
    Response(#[from] ResponseError),

    #[error("connection closed before the response was complete")]
    ConnectionClosed,

    #[error("response exceeds maximum allowed size of {max_bytes} bytes")]
    ResponseTooLarge { max_bytes: usize },

    #[error("request aborted")]
    Aborted,

    #[cfg(feature = "reqwest")]
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Sends a single request and resolves to the complete response.
///
/// Any `Fn(Request) -> impl Future<Output = Result<Response, TransportError>>`
/// closure is a transport too, which keeps test doubles short:
///
/// ```
/// use searchreq::http::{Request, Response};
/// use searchreq::transport::{Transport, TransportError};
///
/// let echo = |req: Request| async move {
///     Ok::<_, TransportError>(Response::new(200).with_body(req.body_bytes().clone()))
/// };
/// fn assert_transport<T: Transport>(_: &T) {}
/// assert_transport(&echo);
/// ```
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>>;
}

impl<T, F> Transport for T
where
    T: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin((self)(request))
    }
}
