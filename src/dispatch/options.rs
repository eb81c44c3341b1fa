use crate::http::Headers;

/// Per-call options for [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
///
/// # Examples
///
/// ```
/// use searchreq::dispatch::DispatchOptions;
///
/// let options = DispatchOptions::new()
///     .header("X-Request-Id", "abc-123")
///     .header("Content-Type", "application/json; charset=utf-8");
/// assert_eq!(options.additional_headers().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    additional_headers: Headers,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header sent on top of the defaults. A name that matches a
    /// default header (case-insensitively) replaces it.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn additional_headers_from(mut self, headers: Headers) -> Self {
        self.additional_headers = headers;
        self
    }

    pub fn additional_headers(&self) -> &Headers {
        &self.additional_headers
    }
}
