//! Protocol constants for the Inertia.js wire contract.
//!
//! Header names here must match what existing Inertia clients send and expect
//! byte for byte. They are lowercase because `http::HeaderName` is
//! case-insensitive and stores names in lowercase form.

/// Inertia protocol header names.
pub mod headers {
    use http::HeaderName;

    /// Marks a request as an Inertia navigation; echoed as `true` on JSON responses.
    pub const X_INERTIA: HeaderName = HeaderName::from_static("x-inertia");

    /// Client's last known asset version.
    pub const X_INERTIA_VERSION: HeaderName = HeaderName::from_static("x-inertia-version");

    /// Sent with a 409 to force a full client-side reload.
    pub const X_INERTIA_LOCATION: HeaderName = HeaderName::from_static("x-inertia-location");

    /// Comma-separated list of props requested in a partial reload.
    pub const X_INERTIA_PARTIAL_DATA: HeaderName =
        HeaderName::from_static("x-inertia-partial-data");

    /// Internal redirect intent, promoted to `Location` before the response is sent.
    pub const X_REDIRECT: HeaderName = HeaderName::from_static("x-redirect");

    /// Default header carrying the signed CSRF payload.
    pub const X_XSRF_TOKEN: HeaderName = HeaderName::from_static("x-xsrf-token");

    /// Stripped from adapter-handled requests.
    pub const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

    /// Used when rebuilding the absolute request URL behind a proxy.
    pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

    /// Used when rebuilding the absolute request URL behind a proxy.
    pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
}

/// Value of the `X-Inertia` response header.
pub const INERTIA_TRUE: &str = "true";

/// Version token reported when asset versioning is disabled.
pub const NO_VERSIONING: &str = "__noversioning__";

/// Default namespace for process-scoped shared props.
pub const DEFAULT_SHARE_KEY: &str = "__inertia__";

/// Default CSRF parameter name (what axios-based clients expect).
pub const DEFAULT_CSRF_PARAM: &str = "XSRF-TOKEN";

/// Message returned with a 400 when CSRF verification fails.
pub const CSRF_FAILURE_MESSAGE: &str = "Unable to verify your data submission.";
