//! TLS-capable transport backed by [`reqwest`].

use tracing::debug;

use super::{BoxFuture, Transport, TransportError};
use crate::config::ClientConfig;
use crate::http::{CredentialsMode, Method, Request, Response};

/// Transport for `https://` endpoints.
///
/// `reqwest` keeps a single cookie store per client, so credentials mode is
/// fixed when the transport is built rather than per request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client whose cookie store follows `config.credentials`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(config.credentials == CredentialsMode::Include)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn round_trip(&self, request: Request) -> Result<Response, TransportError> {
        let method = *request.method();
        let mut builder = self.client.request(upstream_method(method), request.url());
        for (name, value) in request.header_map().iter() {
            builder = builder.header(name, value);
        }
        if method.has_body() {
            builder = builder.body(request.body_bytes().clone());
        }

        let upstream = builder.send().await?;
        let status = upstream.status();
        debug!(url = %upstream.url(), status = status.as_u16(), "response received");

        let mut response = Response::new(status.as_u16())
            .with_reason(status.canonical_reason().unwrap_or_default())
            .with_url(upstream.url().as_str());
        for (name, value) in upstream.headers() {
            if let Ok(value) = value.to_str() {
                response = response.header(name.as_str(), value);
            }
        }

        let body = upstream.bytes().await?;
        Ok(response.with_body(body))
    }
}

fn upstream_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(self.round_trip(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(upstream_method(Method::Post), reqwest::Method::POST);
        assert_eq!(upstream_method(Method::Get), reqwest::Method::GET);
    }

    #[test]
    fn client_builds_for_both_credentials_modes() {
        for mode in [CredentialsMode::Include, CredentialsMode::Omit] {
            let config = ClientConfig::new().credentials(mode);
            assert!(ReqwestTransport::from_config(&config).is_ok());
        }
    }
}
