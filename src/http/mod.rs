//! HTTP/1.1 client-side protocol types.
//!
//! This module provides the primitives the dispatcher and transports share:
//! [`Method`], [`Headers`], [`Request`], and [`Response`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::{CredentialsMode, Request};
pub use response::{Response, ResponseError};

/// Request methods this crate issues. Dispatched calls are always `POST`;
/// `GET` exists for transports and cache keys built by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// `true` if requests with this method carry a body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Get.as_str(), "GET");
    }

    #[test]
    fn only_post_has_body() {
        assert!(Method::Post.has_body());
        assert!(!Method::Get.has_body());
    }
}
