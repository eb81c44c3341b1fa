//! Request dispatch: one outbound search call at a time, with response caching.
//!
//! A [`Dispatcher`] owns three things: a [`Transport`], a [`ResponseCache`], and
//! the in-flight state (one cancellation token plus a counter of active calls).
//!
//! ## Call lifecycle
//!
//! 1. Derive the cache key from `POST`, `base_endpoint + path`, and the params.
//! 2. If caching is requested and the key is present, return the stored
//!    envelope. Nothing else happens: no network call, no cancellation.
//! 3. If an earlier call is still outstanding, cancel its token and start a
//!    fresh one. Bump the counter.
//! 4. Send the request, racing it against the token.
//! 5. On a response: decrement the counter (never below zero), parse the body
//!    as JSON (`{}` if that fails), and store the envelope if caching was
//!    requested and the body parsed.
//! 6. On any transport failure, cancellation included: return
//!    [`Envelope::aborted`]. The counter is left as is.
//!
//! `dispatch` never fails. A superseded call and a network error produce the
//! same envelope.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{QueryCache, ResponseCache};
use crate::config::{CLIENT_NAME_HEADER, CLIENT_VERSION_HEADER, ClientConfig};
use crate::envelope::Envelope;
use crate::http::{Headers, Method, Request, Response};
use crate::transport::{TcpTransport, Transport, TransportError};

pub mod options;

pub use options::DispatchOptions;

/// Method used for every dispatched call.
const METHOD: Method = Method::Post;

// Cancellation handle of the current call and the number of calls started but
// not yet completed successfully.
#[derive(Debug, Default)]
struct InFlight {
    token: CancellationToken,
    active: usize,
}

/// Issues search API calls, caching responses and cancelling superseded calls.
///
/// # Examples
///
/// ```rust,no_run
/// use searchreq::dispatch::{DispatchOptions, Dispatcher};
/// use searchreq::transport::TcpTransport;
/// use serde_json::json;
///
/// # async fn run() {
/// let dispatcher = Dispatcher::new(TcpTransport::new());
/// let envelope = dispatcher
///     .dispatch(
///         "search-key",
///         "http://localhost:3002/api/as/v1/engines/docs",
///         "/search",
///         &json!({"query": "tokio"}),
///         true,
///         DispatchOptions::default(),
///     )
///     .await;
///
/// if envelope.response.ok() {
///     println!("{}", envelope.json.unwrap_or_default());
/// }
/// # }
/// ```
pub struct Dispatcher<T, C = QueryCache> {
    transport: T,
    cache: C,
    config: ClientConfig,
    in_flight: Mutex<InFlight>,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher with an empty [`QueryCache`] and default config.
    pub fn new(transport: T) -> Self {
        Self::with_cache(transport, QueryCache::new())
    }
}

impl Dispatcher<TcpTransport> {
    /// Creates a dispatcher over a [`TcpTransport`] built from `config`, so every
    /// config field, the response size cap included, takes effect.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(TcpTransport::from_config(&config)).with_config(config)
    }
}

impl<T: Transport, C: ResponseCache> Dispatcher<T, C> {
    /// Creates a dispatcher around a caller-supplied cache.
    pub fn with_cache(transport: T, cache: C) -> Self {
        Self {
            transport,
            cache,
            config: ClientConfig::default(),
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    /// Replaces the config used to build requests: client identification
    /// headers and credentials mode.
    ///
    /// `max_response_size` belongs to the transport, which is already built at
    /// this point; use [`Dispatcher::from_config`] or
    /// [`TcpTransport::from_config`] to apply it.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of calls started and not yet completed with a response.
    ///
    /// Failed and cancelled calls are never subtracted, so after a
    /// cancellation this stays above zero until later calls succeed.
    pub fn active_requests(&self) -> usize {
        self.in_flight().active
    }

    /// Sends `params` as a JSON `POST` to `base_endpoint + path`.
    ///
    /// See the [module docs](self) for the full lifecycle. The returned
    /// envelope is one of:
    ///
    /// - a cached envelope, when `should_cache` is set and the key is present;
    /// - `{response, json}` for any received response, whatever its status;
    ///   `json` is `{}` if the body is not valid JSON;
    /// - [`Envelope::aborted`] if the call failed or was superseded.
    pub async fn dispatch(
        &self,
        credential: &str,
        base_endpoint: &str,
        path: &str,
        params: &Value,
        should_cache: bool,
        options: DispatchOptions,
    ) -> Envelope {
        let url = format!("{base_endpoint}{path}");
        let key = self.cache.key(&METHOD, &url, params);

        if should_cache {
            if let Some(cached) = self.cache.retrieve(&key) {
                debug!(key = %key, "cache hit");
                return cached;
            }
        }

        let token = self.begin();
        let request = self.build_request(credential, &url, params, &options);

        debug!(url = %url, cache = should_cache, "dispatching request");

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(TransportError::Aborted),
            result = self.transport.send(request) => result,
        };

        match outcome {
            Ok(response) => {
                self.complete();
                match parse_body(&response) {
                    Some(json) => {
                        let envelope = Envelope::received(response, json);
                        if should_cache {
                            self.cache.store(key, envelope.clone());
                        }
                        envelope
                    }
                    None => Envelope::received(response, Value::Object(Map::new())),
                }
            }
            Err(TransportError::Aborted) => {
                debug!(url = %url, "request superseded");
                Envelope::aborted()
            }
            Err(e) => {
                warn!(url = %url, error = %e, "request failed");
                Envelope::aborted()
            }
        }
    }

    // Cancels the outstanding call, if any, and returns the token for the new one.
    fn begin(&self) -> CancellationToken {
        let mut in_flight = self.in_flight();
        if in_flight.active > 0 {
            debug!(active = in_flight.active, "cancelling previous request");
            in_flight.token.cancel();
            in_flight.token = CancellationToken::new();
        }
        in_flight.active += 1;
        in_flight.token.clone()
    }

    fn complete(&self) {
        let mut in_flight = self.in_flight();
        in_flight.active = in_flight.active.saturating_sub(1);
    }

    fn build_request(
        &self,
        credential: &str,
        url: &str,
        params: &Value,
        options: &DispatchOptions,
    ) -> Request {
        let mut headers = Headers::with_capacity(4 + options.additional_headers().len());
        headers.insert("Authorization", format!("Bearer {credential}"));
        headers.insert("Content-Type", "application/json");
        headers.insert(CLIENT_NAME_HEADER, self.config.client_name.as_str());
        headers.insert(CLIENT_VERSION_HEADER, self.config.client_version.as_str());
        headers.extend_overriding(options.additional_headers());

        Request::new(METHOD, url)
            .headers(headers)
            .body(params.to_string())
            .credentials(self.config.credentials)
    }

    // Nothing under this lock can panic halfway through an update.
    fn in_flight(&self) -> MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_body(response: &Response) -> Option<Value> {
    match serde_json::from_slice(response.body()) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(status = response.status(), error = %e, "response body is not JSON");
            None
        }
    }
}
