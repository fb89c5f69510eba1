//! Response negotiation: the Inertia protocol state machine.
//!
//! ```text
//! Start ─┬─ no X-Inertia ──► InitialLoad ──────────────────────────► Sent
//!        └─ X-Inertia ─────► InertiaNavigation
//!                              (a) 2xx          → JSON + X-Inertia: true
//!                              (b) GET, stale   → 409 + X-Inertia-Location
//!                              (c) 302 after PUT/PATCH/DELETE → 303
//!                            ─► {Passthrough | VersionMismatch | MethodRedirectRewrite} ─► Sent
//! ```
//!
//! The steps run in that order and each observes what the previous one did.
//! Step (b) discards the effects of (a) and the body; step (c) still runs
//! afterwards against whatever status is current.
//!
//! Everything here is synchronous and pure over the response value. The only
//! expensive input, the server's version token, is resolved by the caller and
//! only when [`RequestInfo::needs_version`] says it will be compared.

use crate::protocol::{self, constants::headers, constants::INERTIA_TRUE};
use crate::types::RequestKind;
use axum::body::Body;
use axum::response::Response;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};

/// What the exit hook needs to know about the request.
///
/// Captured before the request is handed to the inner service, since the
/// request value is consumed there.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    /// Initial load or navigation.
    pub kind: RequestKind,
    /// Original request method.
    pub method: Method,
    /// Client's `X-Inertia-Version`, if sent.
    pub client_version: Option<String>,
    /// Absolute URL of the request, for `X-Inertia-Location`.
    pub absolute_url: String,
}

impl RequestInfo {
    /// Capture request details.
    #[must_use]
    pub fn capture(
        method: &Method,
        uri: &http::Uri,
        request_headers: &HeaderMap,
        default_scheme: &str,
    ) -> Self {
        Self {
            kind: RequestKind::from_headers(request_headers),
            method: method.clone(),
            client_version: protocol::request_version(request_headers).map(str::to_string),
            absolute_url: protocol::absolute_url(uri, request_headers, default_scheme),
        }
    }

    /// Whether step (b) will compare versions, so the caller must supply one.
    #[must_use]
    pub fn needs_version(&self) -> bool {
        self.kind.is_navigation() && self.method == Method::GET && self.client_version.is_some()
    }
}

/// Terminal state of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Initial load: the response was left untouched.
    InitialLoad,
    /// Navigation with no status change (step (a) may have applied).
    Passthrough,
    /// Stale client assets: 409 with `X-Inertia-Location`.
    VersionMismatch,
    /// 302 rewritten to 303.
    MethodRedirectRewrite,
}

/// Run the exit pipeline over `response`.
///
/// `server_version` must be `Some` whenever [`RequestInfo::needs_version`] is
/// true; when it is `None` the version check is skipped.
pub fn negotiate(
    info: &RequestInfo,
    response: Response,
    server_version: Option<&str>,
) -> (Response, Outcome) {
    if !info.kind.is_navigation() {
        return (response, Outcome::InitialLoad);
    }

    let (mut parts, mut body) = response.into_parts();
    let mut outcome = Outcome::Passthrough;

    // (a)
    if parts.status.is_success() {
        parts.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        parts
            .headers
            .insert(headers::X_INERTIA, HeaderValue::from_static(INERTIA_TRUE));
    }

    // (b)
    if info.method == Method::GET {
        if let (Some(client), Some(server)) = (info.client_version.as_deref(), server_version) {
            if client != server {
                tracing::debug!(
                    client_version = client,
                    server_version = server,
                    url = %info.absolute_url,
                    "asset version mismatch, forcing full reload"
                );
                parts.headers.remove(header::CONTENT_TYPE);
                parts.headers.remove(header::CONTENT_LENGTH);
                parts.headers.remove(headers::X_INERTIA);
                parts.status = StatusCode::CONFLICT;
                match HeaderValue::from_str(&info.absolute_url) {
                    Ok(location) => {
                        parts.headers.insert(headers::X_INERTIA_LOCATION, location);
                    }
                    Err(_) => {
                        tracing::warn!(url = %info.absolute_url, "request URL is not a valid header value");
                    }
                }
                body = Body::empty();
                outcome = Outcome::VersionMismatch;
            }
        }
    }

    // (c)
    if protocol::is_legacy_redirect(parts.status) && protocol::is_replayed_as_get(&info.method) {
        tracing::debug!(method = %info.method, "rewriting 302 to 303");
        parts.status = StatusCode::SEE_OTHER;
        outcome = Outcome::MethodRedirectRewrite;
    }

    (Response::from_parts(parts, body), outcome)
}

/// Promote an internal `X-Redirect` header to `Location`.
///
/// Lets inner code express redirect intent without touching `Location`
/// directly. The internal header is removed. Returns whether a redirect was
/// promoted.
pub fn promote_redirect(response_headers: &mut HeaderMap) -> bool {
    match response_headers.remove(headers::X_REDIRECT) {
        Some(target) => {
            response_headers.insert(header::LOCATION, target);
            true
        }
        None => false,
    }
}
