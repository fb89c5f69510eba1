//! Shared header parsing for the Inertia protocol.
//!
//! # Header Formats
//!
//! | Header | Format | Example |
//! |--------|--------|---------|
//! | X-Inertia | presence marker, value ignored on requests | `true` |
//! | X-Inertia-Version | opaque token | `5f1c...` |
//! | X-Inertia-Partial-Data | comma-separated prop keys, exact match | `users,filters` |
//! | X-Inertia-Location | absolute URL | `https://app.test/users?page=2` |
//!
//! # Examples
//!
//! ```
//! use inertia_axum_http::protocol::parse_partial_data;
//!
//! let keys = parse_partial_data("name,email");
//! assert_eq!(keys, vec!["name", "email"]);
//! ```

use super::constants::headers;
use http::{header, HeaderMap, Method, StatusCode, Uri};

/// Whether the request carries the Inertia marker header.
///
/// Classification depends on presence only: `X-Inertia: false` still counts
/// as a navigation, exactly as clients and other adapters treat it.
#[inline]
#[must_use]
pub fn is_inertia_request(headers: &HeaderMap) -> bool {
    headers.contains_key(headers::X_INERTIA)
}

/// Client asset version from `X-Inertia-Version`, if sent.
///
/// A header that is not valid visible ASCII is treated as an empty token,
/// which never matches a computed version.
#[must_use]
pub fn request_version(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(headers::X_INERTIA_VERSION)
        .map(|value| value.to_str().unwrap_or(""))
}

/// Split an `X-Inertia-Partial-Data` value into prop keys.
///
/// Keys are taken verbatim: no trimming, no case folding. Empty segments are
/// dropped so an empty header never matches anything.
///
/// # Examples
///
/// ```
/// use inertia_axum_http::protocol::parse_partial_data;
///
/// assert_eq!(parse_partial_data("a,b"), vec!["a", "b"]);
/// assert_eq!(parse_partial_data("a, b"), vec!["a", " b"]);
/// assert!(parse_partial_data("").is_empty());
/// ```
#[must_use]
pub fn parse_partial_data(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Methods whose 302 redirects must be rewritten to 303.
///
/// Browsers replay a 302 with the original method; after PUT, PATCH or DELETE
/// the client must follow up with a GET instead.
#[inline]
#[must_use]
pub fn is_replayed_as_get(method: &Method) -> bool {
    matches!(*method, Method::PUT | Method::PATCH | Method::DELETE)
}

/// Whether the request method mutates state and therefore needs a CSRF token.
#[inline]
#[must_use]
pub fn is_state_changing(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Whether `status` is the legacy redirect a follow-up GET rewrite applies to.
#[inline]
#[must_use]
pub fn is_legacy_redirect(status: StatusCode) -> bool {
    status.is_redirection() && status == StatusCode::FOUND
}

/// Reconstruct the absolute URL of the incoming request.
///
/// Resolution order for the scheme: the URI itself, `X-Forwarded-Proto`, then
/// `default_scheme`. For the authority: the URI, `X-Forwarded-Host`, then
/// `Host`. Without any authority the path and query are returned as is.
///
/// The path and query are kept exactly as received, so the result always
/// names the host the request was sent to.
///
/// # Examples
///
/// ```
/// use inertia_axum_http::protocol::absolute_url;
/// use http::{HeaderMap, HeaderValue, Uri};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(http::header::HOST, HeaderValue::from_static("app.test"));
/// let uri: Uri = "/users?page=2".parse().unwrap();
/// assert_eq!(absolute_url(&uri, &headers, "https"), "https://app.test/users?page=2");
/// ```
#[must_use]
pub fn absolute_url(uri: &Uri, headers: &HeaderMap, default_scheme: &str) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let scheme = uri
        .scheme_str()
        .map(str::to_string)
        .or_else(|| first_forwarded_value(headers, &headers::X_FORWARDED_PROTO))
        .unwrap_or_else(|| default_scheme.to_string());

    let authority = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| first_forwarded_value(headers, &headers::X_FORWARDED_HOST))
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });

    let Some(authority) = authority else {
        return path_and_query.to_string();
    };

    // The request target is appended verbatim: no dot-segment removal, no
    // re-encoding, and a leading `//` stays part of the path.
    format!("{scheme}://{authority}{path_and_query}")
}

fn first_forwarded_value(headers: &HeaderMap, name: &http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
