//! Outbound HTTP/1.1 requests and their wire serialization.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::{Headers, Method};

/// Whether cookies travel with a request, mirroring the browser's
/// `credentials` fetch option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsMode {
    /// Send stored cookies and remember the ones the server sets.
    #[default]
    Include,
    /// Never send or store cookies.
    Omit,
}

/// An HTTP request ready to be handed to a [`Transport`](crate::transport::Transport).
///
/// # Examples
///
/// ```
/// use searchreq::http::{Method, Request};
///
/// let request = Request::new(Method::Post, "http://localhost:3002/api/as/v1/search")
///     .header("Content-Type", "application/json")
///     .body(r#"{"query":"rust"}"#);
///
/// let bytes = request.to_wire("localhost:3002", "/api/as/v1/search");
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("POST /api/as/v1/search HTTP/1.1\r\n"));
/// assert!(text.contains("Content-Length: 16\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    headers: Headers,
    body: Bytes,
    credentials: CredentialsMode,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: Bytes::new(),
            credentials: CredentialsMode::default(),
        }
    }

    /// Appends a header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the whole header map.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.credentials = mode;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header_map(&self) -> &Headers {
        &self.headers
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn credentials_mode(&self) -> CredentialsMode {
        self.credentials
    }

    /// Serializes the request into HTTP/1.1 wire format.
    ///
    /// `host` becomes the `Host` header and `target` the request-target
    /// (path plus query). Automatically adds:
    /// - `Host: <host>` unless already present.
    /// - `Connection: close`, since transports use one connection per request.
    /// - `Content-Length: <n>` (always written, last before the blank line).
    pub fn to_wire(&self, host: &str, target: &str) -> BytesMut {
        let content_length = self.body.len();
        let estimated_size = 128 + self.headers.len() * 64 + content_length;
        let mut buf = BytesMut::with_capacity(estimated_size);

        // Request line
        buf.put(format!("{} {} HTTP/1.1\r\n", self.method, target).as_bytes());

        if !self.headers.contains("host") {
            buf.put(format!("Host: {host}\r\n").as_bytes());
        }

        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("content-length") || name.eq_ignore_ascii_case("connection") {
                continue;
            }
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }

        buf.put(&b"Connection: close\r\n"[..]);
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());

        // Header/body separator
        buf.put(&b"\r\n"[..]);

        if !self.body.is_empty() {
            buf.put(self.body.as_ref());
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn post_with_json_body() {
        let r = Request::new(Method::Post, "http://example.com/search")
            .header("Content-Type", "application/json")
            .body(r#"{"q":"a"}"#);
        let s = to_string(r.to_wire("example.com", "/search"));
        assert!(s.starts_with("POST /search HTTP/1.1\r\n"));
        assert!(s.contains("Host: example.com\r\n"));
        assert!(s.contains("Content-Type: application/json\r\n"));
        assert!(s.contains("Content-Length: 9\r\n"));
        assert!(s.ends_with("\r\n\r\n{\"q\":\"a\"}"));
    }

    #[test]
    fn explicit_host_is_not_duplicated() {
        let r = Request::new(Method::Get, "http://10.0.0.1/").header("Host", "search.internal");
        let s = to_string(r.to_wire("10.0.0.1", "/"));
        assert_eq!(s.matches("Host:").count(), 1);
        assert!(s.contains("Host: search.internal\r\n"));
    }

    #[test]
    fn caller_connection_and_length_are_replaced() {
        let r = Request::new(Method::Post, "http://h/")
            .header("Connection", "keep-alive")
            .header("Content-Length", "999")
            .body("hi");
        let s = to_string(r.to_wire("h", "/"));
        assert!(!s.contains("keep-alive"));
        assert!(!s.contains("999"));
        assert!(s.contains("Connection: close\r\n"));
        assert!(s.contains("Content-Length: 2\r\n"));
    }

    #[test]
    fn credentials_default_to_include() {
        let r = Request::new(Method::Post, "http://h/");
        assert_eq!(r.credentials_mode(), CredentialsMode::Include);
        let r = r.credentials(CredentialsMode::Omit);
        assert_eq!(r.credentials_mode(), CredentialsMode::Omit);
    }
}
