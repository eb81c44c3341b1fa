//! Cache key derivation from request attributes.

use std::fmt;

use serde_json::Value;

use crate::http::Method;

/// Fingerprint of a request: method, full URL, and serialized parameters.
///
/// The three components are kept verbatim, so two keys are equal exactly when
/// all three inputs are. Parameters are serialized with `serde_json`, whose
/// object maps keep keys sorted; equal [`Value`]s therefore always produce
/// equal keys regardless of how the caller built them.
///
/// # Examples
///
/// ```
/// use searchreq::cache::CacheKey;
/// use searchreq::http::Method;
/// use serde_json::json;
///
/// let a = CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": "a", "page": 1}));
/// let b = CacheKey::new(&Method::Post, "https://api.x/search", &json!({"page": 1, "q": "a"}));
/// let c = CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": "b", "page": 1}));
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    url: String,
    params: String,
}

impl CacheKey {
    pub fn new(method: &Method, url: &str, params: &Value) -> Self {
        Self {
            method: *method,
            url: url.to_owned(),
            params: params.to_string(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serialized parameters as they took part in the key.
    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.url, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_inputs_match() {
        let params = json!({"query": "rust", "filters": {"tags": ["async"]}});
        let a = CacheKey::new(&Method::Post, "https://api.x/search", &params);
        let b = CacheKey::new(&Method::Post, "https://api.x/search", &params.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn each_component_discriminates() {
        let base = CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": "a"}));
        assert_ne!(base, CacheKey::new(&Method::Get, "https://api.x/search", &json!({"q": "a"})));
        assert_ne!(base, CacheKey::new(&Method::Post, "https://api.x/suggest", &json!({"q": "a"})));
        assert_ne!(base, CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": "A"})));
        assert_ne!(base, CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": ["a"]})));
    }

    #[test]
    fn number_and_string_params_differ() {
        let a = CacheKey::new(&Method::Post, "u", &json!({"page": 1}));
        let b = CacheKey::new(&Method::Post, "u", &json!({"page": "1"}));
        assert_ne!(a, b);
    }

    #[test]
    fn display_lists_components() {
        let key = CacheKey::new(&Method::Post, "https://api.x/search", &json!({"q": "a"}));
        assert_eq!(key.to_string(), r#"POST https://api.x/search {"q":"a"}"#);
    }
}
