//! Error types for the Inertia adapter.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Errors map onto
//! HTTP status codes via [`InertiaError::status`], so handlers can simply use `?`
//! and return `Result<Response>`.
//!
//! | Variant | Status | Cause |
//! |---------|--------|-------|
//! | `BadRequest` | 400 | CSRF token missing or invalid on a state-changing method |
//! | `AssetDirectory` | 500 | An asset directory could not be read while fingerprinting |
//! | `Template` | 500 | The root view could not be loaded or rendered |
//! | `Serialize` | 500 | The page object could not be serialized |
//! | `Config` | 500 | Misconfiguration detected at runtime |
//! | `MissingContext` | 500 | A handler asked for Inertia state outside `InertiaLayer` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, InertiaError>;

/// Errors produced by the Inertia adapter.
#[derive(Error, Debug)]
pub enum InertiaError {
    /// The request was rejected before reaching the handler.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An asset directory could not be enumerated or one of its files read.
    #[error("unable to hash asset directory {}: {source}", path.display())]
    AssetDirectory {
        /// The directory or file that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Root view failure.
    #[error("template error: {0}")]
    Template(String),

    /// Page serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid adapter configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// `InertiaLayer` was not installed on the route.
    #[error("inertia context missing from request extensions (is InertiaLayer installed?)")]
    MissingContext,
}

impl InertiaError {
    /// HTTP status this error is surfaced as.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            InertiaError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn asset_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InertiaError::AssetDirectory {
            path: path.into(),
            source,
        }
    }
}

impl IntoResponse for InertiaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            InertiaError::BadRequest(message) => message.clone(),
            _ => {
                tracing::error!(error = %self, "inertia request failed");
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
        };
        if status.is_client_error() {
            tracing::warn!(error = %self, "inertia request rejected");
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            InertiaError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InertiaError::asset_dir("/missing", std::io::ErrorKind::NotFound.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            InertiaError::MissingContext.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_asset_dir_message_names_path() {
        let err = InertiaError::asset_dir("/srv/assets", std::io::ErrorKind::NotFound.into());
        assert!(err.to_string().contains("/srv/assets"));
    }

    #[test]
    fn test_bad_request_body_is_message() {
        let response = InertiaError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
