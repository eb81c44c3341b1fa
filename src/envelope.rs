//! The uniform result of every dispatch.

use serde_json::Value;

use crate::http::Response;

/// Message carried by the synthetic failure envelope.
pub const ABORTED_MESSAGE: &str = "aborted";

/// Response half of an [`Envelope`].
///
/// A cancelled call and a failed call both end up as `Failed`; callers cannot
/// tell them apart.
#[derive(Debug, Clone)]
pub enum ResponseMeta {
    Received(Response),
    Failed { message: String },
}

impl ResponseMeta {
    /// `true` only for a received 2xx response.
    pub fn ok(&self) -> bool {
        match self {
            Self::Received(response) => response.ok(),
            Self::Failed { .. } => false,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Received(_) => None,
            Self::Failed { message } => Some(message),
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Received(response) => Some(response),
            Self::Failed { .. } => None,
        }
    }
}

/// `{response, json}` pair returned by
/// [`Dispatcher::dispatch`](crate::dispatch::Dispatcher::dispatch) and stored in the cache.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub response: ResponseMeta,
    /// Parsed body. `Some({})` when the body was not valid JSON, `None` on the failure path.
    pub json: Option<Value>,
}

impl Envelope {
    pub fn received(response: Response, json: Value) -> Self {
        Self {
            response: ResponseMeta::Received(response),
            json: Some(json),
        }
    }

    /// The `{response: {ok: false, message: "aborted"}}` shape.
    pub fn aborted() -> Self {
        Self {
            response: ResponseMeta::Failed {
                message: ABORTED_MESSAGE.to_owned(),
            },
            json: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.response.message() == Some(ABORTED_MESSAGE)
    }
}
