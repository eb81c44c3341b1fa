//! HTTP/1.1 response parsing using the [`httparse`] crate.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::Headers;

/// Errors that can occur while parsing an HTTP/1.1 response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("malformed chunked body")]
    InvalidChunk,
}

/// A received HTTP response: status line, headers, and the full body.
///
/// Created by [`Response::parse`] from a raw byte buffer, or directly with
/// [`Response::new`] by transports that do their own framing.
///
/// # Examples
///
/// ```
/// use searchreq::http::Response;
///
/// let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
/// let (response, offset) = Response::parse(raw).unwrap();
///
/// assert_eq!(response.status(), 200);
/// assert!(response.ok());
/// assert_eq!(response.content_length(), Some(2));
/// assert_eq!(&raw[offset..], b"{}");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: String,
    headers: Headers,
    body: Bytes,
    url: String,
}

impl Response {
    /// Maximum number of headers we support per response.
    const MAX_HEADERS: usize = 64;

    /// Creates a response with the given status, no reason phrase, and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: String::new(),
            headers: Headers::new(),
            body: Bytes::new(),
            url: String::new(),
        }
    }

    /// Parses a response head from a byte slice.
    ///
    /// Returns the parsed `Response` and the byte offset at which the body begins
    /// in `buf`. Everything after that offset is copied into the body as-is; the
    /// caller is responsible for trimming it to `Content-Length` or decoding
    /// chunked framing.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Incomplete`] — more data is needed to complete the headers.
    /// - [`ResponseError::Parse`] — the data is malformed and cannot be parsed.
    /// - [`ResponseError::MissingField`] — the status code is absent.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), ResponseError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_res = httparse::Response::new(&mut headers);

        let body_offset = match raw_res.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(ResponseError::Incomplete),
        };

        let status = raw_res
            .code
            .ok_or(ResponseError::MissingField { field: "status" })?;
        let reason = raw_res.reason.unwrap_or_default().to_owned();

        let mut header_map = Headers::with_capacity(raw_res.headers.len());
        for header in raw_res.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.insert(header.name, value);
            }
        }

        Ok((
            Self {
                status,
                reason,
                headers: header_map,
                body: Bytes::copy_from_slice(&buf[body_offset..]),
                url: String::new(),
            },
            body_offset,
        ))
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the reason phrase.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Records the URL this response was fetched from.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns the numeric status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the reason phrase sent by the server.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// `true` for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the value of the `Content-Length` header parsed as a `usize`, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length")?.trim().parse().ok()
    }

    /// Returns `true` if the body uses chunked transfer coding.
    pub fn is_chunked(&self) -> bool {
        self.headers
            .get_all("transfer-encoding")
            .flat_map(|v| v.split(','))
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    }
}

/// Decodes a chunked body (RFC 9112 §7.1). Trailers are discarded.
///
/// # Errors
///
/// - [`ResponseError::Incomplete`] — the data stops before the terminating
///   zero-size chunk and the blank line after any trailers.
/// - [`ResponseError::InvalidChunk`] — a chunk header is malformed, a chunk size
///   does not fit in memory, or chunk data is not followed by CRLF.
pub fn decode_chunked(mut buf: &[u8]) -> Result<Bytes, ResponseError> {
    let mut out = BytesMut::with_capacity(buf.len());

    loop {
        let (offset, size) = match httparse::parse_chunk_size(buf) {
            Ok(httparse::Status::Complete(pair)) => pair,
            Ok(httparse::Status::Partial) => return Err(ResponseError::Incomplete),
            Err(_) => return Err(ResponseError::InvalidChunk),
        };
        buf = &buf[offset..];

        if size == 0 {
            return if trailers_complete(buf) {
                Ok(out.freeze())
            } else {
                Err(ResponseError::Incomplete)
            };
        }

        let data_end = usize::try_from(size)
            .ok()
            .and_then(|size| size.checked_add(2))
            .ok_or(ResponseError::InvalidChunk)?;
        if buf.len() < data_end {
            return Err(ResponseError::Incomplete);
        }
        let size = data_end - 2;
        if &buf[size..data_end] != b"\r\n" {
            return Err(ResponseError::InvalidChunk);
        }
        out.put(&buf[..size]);
        buf = &buf[data_end..];
    }
}

// The trailer section ends with an empty line; with no trailers that line
// immediately follows the zero-size chunk.
fn trailers_complete(buf: &[u8]) -> bool {
    buf.starts_with(b"\r\n") || buf.windows(4).any(|window| window == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"a\":[1,2]}";
        let (res, offset) = Response::parse(raw).unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.reason(), "OK");
        assert_eq!(res.headers().get("content-type"), Some("application/json"));
        assert_eq!(res.content_length(), Some(11));
        assert_eq!(res.body().as_ref(), b"{\"a\":[1,2]}");
        assert_eq!(offset, raw.len() - 11);
    }

    #[test]
    fn incomplete_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-";
        assert!(matches!(Response::parse(raw), Err(ResponseError::Incomplete)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let raw = b"NOT HTTP AT ALL\r\n\r\n";
        assert!(matches!(Response::parse(raw), Err(ResponseError::Parse(_))));
    }

    #[test]
    fn non_success_is_not_ok() {
        let raw = b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n";
        let (res, _) = Response::parse(raw).unwrap();
        assert!(!res.ok());
        assert_eq!(res.status(), 401);
        assert_eq!(res.reason(), "Unauthorized");
    }

    #[test]
    fn chunked_detection() {
        let res = Response::new(200).header("Transfer-Encoding", "gzip, chunked");
        assert!(res.is_chunked());
        assert!(!Response::new(200).is_chunked());
    }

    #[test]
    fn decode_two_chunks() {
        let body = b"4\r\n{\"a\"\r\n3\r\n:1}\r\n0\r\n\r\n";
        assert_eq!(decode_chunked(body).unwrap().as_ref(), b"{\"a\":1}");
    }

    #[test]
    fn short_chunk_needs_more_data() {
        let body = b"a\r\nshort";
        assert!(matches!(decode_chunked(body), Err(ResponseError::Incomplete)));
    }

    #[test]
    fn missing_terminal_chunk_needs_more_data() {
        let body = b"3\r\nabc\r\n";
        assert!(matches!(decode_chunked(body), Err(ResponseError::Incomplete)));
        let body = b"3\r\nabc\r\n0\r\n";
        assert!(matches!(decode_chunked(body), Err(ResponseError::Incomplete)));
    }

    #[test]
    fn trailers_are_skipped() {
        let body = b"3\r\nabc\r\n0\r\nX-Checksum: 1\r\n\r\n";
        assert_eq!(decode_chunked(body).unwrap().as_ref(), b"abc");
    }

    #[test]
    fn huge_chunk_size_is_rejected() {
        let body = b"ffffffffffffffff\r\nabc\r\n0\r\n\r\n";
        assert!(matches!(decode_chunked(body), Err(ResponseError::InvalidChunk)));
    }

    #[test]
    fn chunk_without_trailing_crlf_is_rejected() {
        let body = b"3\r\nabcXY0\r\n\r\n";
        assert!(matches!(decode_chunked(body), Err(ResponseError::InvalidChunk)));
    }

    #[test]
    fn bad_chunk_size_is_rejected() {
        let body = b"zz\r\nabc\r\n0\r\n\r\n";
        assert!(matches!(decode_chunked(body), Err(ResponseError::InvalidChunk)));
    }

    #[test]
    fn new_has_no_reason_until_set() {
        assert_eq!(Response::new(404).reason(), "");
        assert_eq!(Response::new(404).with_reason("Not Found").reason(), "Not Found");
    }
}
