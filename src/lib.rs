//! # searchreq
//!
//! A small request dispatcher for search APIs: JSON `POST` calls with bearer
//! authentication, an in-memory response cache, and cancellation of
//! superseded requests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use searchreq::{DispatchOptions, Dispatcher, TcpTransport};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(TcpTransport::new());
//!     let envelope = dispatcher
//!         .dispatch(
//!             "search-key",
//!             "http://localhost:3002/api/as/v1/engines/docs",
//!             "/search",
//!             &json!({"query": "cancellation"}),
//!             true,
//!             DispatchOptions::default(),
//!         )
//!         .await;
//!     println!("ok = {}", envelope.response.ok());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod http;
pub mod transport;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheKey, QueryCache, ResponseCache};
pub use config::ClientConfig;
pub use dispatch::{DispatchOptions, Dispatcher};
pub use envelope::{Envelope, ResponseMeta};
pub use http::{CredentialsMode, Headers, Method, Request, Response};
pub use transport::{TcpTransport, Transport, TransportError};
