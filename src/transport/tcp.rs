//! HTTP/1.1 client transport over a plain Tokio `TcpStream`.
//!
//! One connection per request: the request is sent with `Connection: close`,
//! and the response is complete once its `Content-Length` or chunked framing
//! is satisfied, or, for unframed bodies, once the server closes the stream.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use super::{BoxFuture, Transport, TransportError};
use crate::config::{ClientConfig, DEFAULT_MAX_RESPONSE_SIZE};
use crate::http::{
    CredentialsMode, Headers, Request, Response,
    response::{ResponseError, decode_chunked},
};

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// Plain-HTTP transport.
///
/// Rejects anything but `http://` URLs with [`TransportError::UnsupportedScheme`].
/// When a request's credentials mode is [`CredentialsMode::Include`], cookies set
/// by a host are replayed on later requests to the same host.
///
/// # Examples
///
/// ```rust,no_run
/// use searchreq::http::{Method, Request};
/// use searchreq::transport::{TcpTransport, Transport};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = TcpTransport::new();
/// let response = transport
///     .send(Request::new(Method::Post, "http://127.0.0.1:3002/api/as/v1/engines/docs/search"))
///     .await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpTransport {
    max_response_size: usize,
    cookies: CookieJar,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            cookies: CookieJar::default(),
        }
    }

    /// Creates a transport honoring the config's response size cap.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new().max_response_size(config.max_response_size)
    }

    /// Caps the buffered response, headers included.
    #[must_use]
    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    async fn round_trip(&self, request: Request) -> Result<Response, TransportError> {
        let url = Url::parse(request.url()).map_err(|source| TransportError::InvalidUrl {
            url: request.url().to_owned(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| TransportError::MissingHost(request.url().to_owned()))?;
        let port = url.port_or_known_default().unwrap_or(80);
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        let target = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_owned(),
        };

        let include_cookies = request.credentials_mode() == CredentialsMode::Include;
        let mut request = request;
        if include_cookies {
            if let Some(cookie) = self.cookies.header_for(host) {
                request = request.header("Cookie", cookie);
            }
        }

        let mut stream = TcpStream::connect(format!("{host}:{port}")).await?;
        debug!(
            method = %request.method(),
            url = %url,
            "request sent"
        );

        stream.write_all(&request.to_wire(&authority, &target)).await?;
        stream.flush().await?;

        let response = self.read_response(&mut stream).await?;
        debug!(url = %url, status = response.status(), "response received");

        if include_cookies {
            self.cookies.record(host, response.headers());
        }

        Ok(response.with_url(request.url()))
    }

    /// Reads until the response is complete.
    ///
    /// `Content-Length` and chunked bodies finish as soon as they are fully
    /// buffered; unframed bodies finish when the server closes the stream.
    async fn read_response(&self, stream: &mut TcpStream) -> Result<Response, TransportError> {
        let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);

        loop {
            let bytes_read = stream.read_buf(&mut buf).await?;
            let eof = bytes_read == 0;

            if buf.len() > self.max_response_size {
                return Err(TransportError::ResponseTooLarge {
                    max_bytes: self.max_response_size,
                });
            }

            let (head, body_offset) = match Response::parse(&buf) {
                Ok(pair) => pair,
                Err(ResponseError::Incomplete) if eof => {
                    return Err(TransportError::ConnectionClosed);
                }
                // Headers not yet fully received; read more data.
                Err(ResponseError::Incomplete) => continue,
                Err(e) => return Err(e.into()),
            };

            if head.is_chunked() {
                match decode_chunked(&buf[body_offset..]) {
                    Ok(body) => return Ok(head.with_body(body)),
                    Err(ResponseError::Incomplete) if eof => {
                        return Err(TransportError::ConnectionClosed);
                    }
                    Err(ResponseError::Incomplete) => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            match head.content_length() {
                Some(len) if buf.len() >= body_offset + len => {
                    let body = Bytes::copy_from_slice(&buf[body_offset..body_offset + len]);
                    return Ok(head.with_body(body));
                }
                Some(_) if eof => return Err(TransportError::ConnectionClosed),
                Some(_) => continue,
                // No framing: the body runs until the server closes.
                None if eof => return Ok(head),
                None => continue,
            }
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(self.round_trip(request))
    }
}

/// Per-host `name=value` cookie store. Attributes other than `Max-Age=0`
/// (deletion) are ignored.
#[derive(Debug, Default)]
struct CookieJar {
    by_host: Mutex<HashMap<String, Vec<(String, String)>>>,
}

impl CookieJar {
    fn header_for(&self, host: &str) -> Option<String> {
        let jar = self.lock();
        let cookies = jar.get(host).filter(|cookies| !cookies.is_empty())?;
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn record(&self, host: &str, headers: &Headers) {
        let mut jar = self.lock();
        for set_cookie in headers.get_all("set-cookie") {
            let mut parts = set_cookie.split(';');
            let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }
            let expired = parts.any(|attr| attr.trim().eq_ignore_ascii_case("max-age=0"));

            let cookies = jar.entry(host.to_owned()).or_default();
            cookies.retain(|(existing, _)| existing != name);
            if !expired {
                cookies.push((name.to_owned(), value.to_owned()));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(String, String)>>> {
        self.by_host.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[tokio::test]
    async fn https_is_rejected() {
        let transport = TcpTransport::new();
        let err = transport
            .send(Request::new(Method::Post, "https://api.x/search"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(scheme) if scheme == "https"));
    }

    #[tokio::test]
    async fn relative_url_is_invalid() {
        let transport = TcpTransport::new();
        let err = transport
            .send(Request::new(Method::Post, "/search"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn cookie_jar_replaces_and_deletes() {
        let jar = CookieJar::default();
        let mut headers = Headers::new();
        headers.insert("Set-Cookie", "session=abc; Path=/; HttpOnly");
        headers.insert("Set-Cookie", "theme=dark");
        jar.record("api.x", &headers);
        assert_eq!(jar.header_for("api.x").as_deref(), Some("session=abc; theme=dark"));
        assert_eq!(jar.header_for("other.x"), None);

        let mut headers = Headers::new();
        headers.insert("Set-Cookie", "session=def");
        headers.insert("Set-Cookie", "theme=; Max-Age=0");
        jar.record("api.x", &headers);
        assert_eq!(jar.header_for("api.x").as_deref(), Some("session=def"));
    }

    #[test]
    fn malformed_set_cookie_is_ignored() {
        let jar = CookieJar::default();
        let mut headers = Headers::new();
        headers.insert("Set-Cookie", "no-equals-sign");
        headers.insert("Set-Cookie", "=orphan");
        jar.record("api.x", &headers);
        assert_eq!(jar.header_for("api.x"), None);
    }
}
