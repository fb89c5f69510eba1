#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Inertia.js for Axum
//!
//! Server-side adapter for the [Inertia protocol](https://inertiajs.com/the-protocol):
//! full-page navigations become JSON exchanges so a single-page front end can
//! swap views without reloading, while the first visit still gets a complete
//! HTML document.
//!
//! ## Overview
//!
//! 1. **Negotiation** - `X-Inertia` requests get the page object as JSON; other requests get the root view
//! 2. **Asset versioning** - a fingerprint of the asset directories; stale clients get `409` + `X-Inertia-Location`
//! 3. **Shared props** - data merged into every page, request-scoped by default
//! 4. **Partial reloads** - `X-Inertia-Partial-Data` tells handlers which props to compute
//! 5. **CSRF bridge** - signed `XSRF-TOKEN` cookie echoed back in `X-XSRF-TOKEN`
//!
//! - **HTTP Status Codes**:
//!   - `409 Conflict` - asset version mismatch
//!   - `303 See Other` - replaces `302` after PUT, PATCH and DELETE
//!   - `400 Bad Request` - CSRF verification failed
//!
//! ## Server Usage
//!
//! ```ignore
//! use axum::{response::Response, routing::get, Router};
//! use inertia_axum_http::{Inertia, InertiaLayer, Result};
//! use serde_json::json;
//!
//! async fn users(inertia: Inertia) -> Result<Response> {
//!     inertia.render("Users/Index", json!({"users": ["ann", "bob"]})).await
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let inertia = InertiaLayer::new().share("appName", "Demo");
//!     let app = inertia.apply(Router::new().route("/users", get(users)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Page object, request classification, partial reloads
//! - **[error]** - Error types and result handling
//! - **[version]** - Asset fingerprinting
//! - **[server]** - Axum integration (layer, extractor, config, CSRF, root view)
//! - **[protocol]** - Protocol constants and header parsing

pub mod error;
pub mod protocol;
pub mod server;
pub mod types;
pub mod version;

pub use error::{InertiaError, Result};
pub use server::{
    CsrfConfig, Inertia, InertiaConfig, InertiaContext, InertiaLayer, RootView, SharedProps,
    SharedScope,
};
pub use types::{Page, PartialReload, Props, RequestKind};
pub use version::{compute_version, Fingerprint};
