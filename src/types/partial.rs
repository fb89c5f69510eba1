//! Partial reload requests.

use crate::protocol::{self, constants::headers};
use http::HeaderMap;

/// Prop keys requested through `X-Inertia-Partial-Data`.
///
/// Lives for one request. Call sites consult it to skip computing expensive
/// props the client did not ask for.
///
/// ```
/// use inertia_axum_http::PartialReload;
///
/// let only = PartialReload::parse("name,email");
/// assert!(only.contains("email"));
/// assert!(!only.contains("age"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialReload {
    raw: String,
    keys: Vec<String>,
}

impl PartialReload {
    /// Parse a raw header value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            keys: protocol::parse_partial_data(raw),
        }
    }

    /// Read the header from a request; absent header yields an empty set.
    #[must_use]
    pub fn from_headers(map: &HeaderMap) -> Self {
        map.get(headers::X_INERTIA_PARTIAL_DATA)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Exact, case-sensitive membership test.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Raw header value (empty when the header was absent).
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Requested keys in header order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether no keys were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_membership() {
        let only = PartialReload::parse("name,email");
        assert!(only.contains("email"));
        assert!(only.contains("name"));
        assert!(!only.contains("age"));
        assert!(!only.contains("Name"));
    }

    #[test]
    fn test_absent_header_matches_nothing() {
        let only = PartialReload::from_headers(&HeaderMap::new());
        assert!(only.is_empty());
        assert!(!only.contains(""));
        assert!(!only.contains("name"));
        assert_eq!(only.raw(), "");
    }

    #[test]
    fn test_from_headers() {
        let mut map = HeaderMap::new();
        map.insert(
            headers::X_INERTIA_PARTIAL_DATA,
            HeaderValue::from_static("users,filters"),
        );
        let only = PartialReload::from_headers(&map);
        assert_eq!(only.keys(), ["users".to_string(), "filters".to_string()]);
        assert_eq!(only.raw(), "users,filters");
    }
}
