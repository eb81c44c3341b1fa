//! Dispatcher configuration.
//!
//! Every field has a default, so a partial document deserializes cleanly:
//!
//! ```
//! use searchreq::config::ClientConfig;
//! use searchreq::http::CredentialsMode;
//!
//! let config: ClientConfig = serde_json::from_str(r#"{"credentials":"omit"}"#).unwrap();
//! assert_eq!(config.credentials, CredentialsMode::Omit);
//! assert_eq!(config.client_version, env!("CARGO_PKG_VERSION"));
//! ```

use serde::{Deserialize, Serialize};

use crate::http::CredentialsMode;

/// Default cap on a buffered response (8 MiB).
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024;

/// Header carrying the client name.
pub const CLIENT_NAME_HEADER: &str = "X-Swiftype-Client";

/// Header carrying the client's semantic version.
pub const CLIENT_VERSION_HEADER: &str = "X-Swiftype-Client-Version";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Sent in [`CLIENT_NAME_HEADER`] on every request.
    pub client_name: String,
    /// Sent in [`CLIENT_VERSION_HEADER`] on every request.
    pub client_version: String,
    pub credentials: CredentialsMode,
    /// Largest response, headers included, a transport will buffer. Read by
    /// [`TcpTransport::from_config`](crate::TcpTransport::from_config), not by the dispatcher.
    pub max_response_size: usize,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    #[must_use]
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    #[must_use]
    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.credentials = mode;
        self
    }

    #[must_use]
    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: env!("CARGO_PKG_NAME").to_owned(),
            client_version: env!("CARGO_PKG_VERSION").to_owned(),
            credentials: CredentialsMode::Include,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}
