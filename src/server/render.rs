//! Page rendering for handlers.
//!
//! [`Inertia`] is an extractor available on every route behind
//! [`InertiaLayer`](crate::InertiaLayer). It builds the page object from the
//! shared props, the handler's props, the request URL and the asset version,
//! and answers with JSON for navigations or the root view for initial loads.
//!
//! # Examples
//!
//! ```ignore
//! use inertia_axum_http::{Inertia, Result};
//! use axum::response::Response;
//! use serde_json::json;
//!
//! async fn users(inertia: Inertia) -> Result<Response> {
//!     let mut props = json!({"users": load_users()});
//!     if inertia.check_only("stats") {
//!         props["stats"] = expensive_stats();
//!     }
//!     inertia.render("Users/Index", props).await
//! }
//! ```

use super::middleware::InertiaContext;
use crate::error::{InertiaError, Result};
use crate::protocol::constants::headers;
use crate::server::SharedProps;
use crate::types::{merge_props, Page, PartialReload, Props, RequestKind};
use axum::extract::FromRequestParts;
use axum::response::{Html, IntoResponse, Json, Response};
use http::request::Parts;
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Per-request rendering handle.
#[derive(Clone, Debug)]
pub struct Inertia {
    context: InertiaContext,
}

impl Inertia {
    pub(crate) fn new(context: InertiaContext) -> Self {
        Self { context }
    }

    /// Build the page object without rendering it.
    ///
    /// `props` must serialize to a JSON object (or `null`, meaning none).
    pub async fn page(&self, component: &str, props: impl Serialize) -> Result<Page> {
        let local = into_props(props)?;
        let version = self.context.version.get().await?;
        Ok(Page::new(
            component,
            merge_props(self.context.shared.all(), local),
            self.context.url.clone(),
            version,
        ))
    }

    /// Render `component` with `props` merged over the shared props.
    ///
    /// # Arguments
    ///
    /// * `component` - Client-side page component name, e.g. `"Users/Index"`
    /// * `props` - Anything serializing to a JSON object; `()` means no props
    ///
    /// # Returns
    ///
    /// The page object as JSON for Inertia navigations, or the root view with
    /// the page embedded for initial loads.
    ///
    /// # Errors
    ///
    /// Fails when `props` is not an object, the asset version cannot be
    /// computed, or the page does not serialize.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// async fn show(inertia: Inertia) -> Result<Response> {
    ///     inertia.render("Users/Show", json!({"user": {"id": 1}})).await
    /// }
    /// ```
    pub async fn render(&self, component: &str, props: impl Serialize) -> Result<Response> {
        let page = self.page(component, props).await?;
        match self.context.kind {
            RequestKind::InertiaNavigation => Ok(Json(page).into_response()),
            RequestKind::InitialLoad => Ok(Html(self.context.view.render(&page)?).into_response()),
        }
    }

    /// Redirect by intent: sets `X-Redirect`, which the layer turns into
    /// `Location` (and a 303 after PUT, PATCH or DELETE navigations).
    pub fn redirect(&self, to: &str) -> Result<Response> {
        let target = HeaderValue::from_str(to)
            .map_err(|_| InertiaError::Config(format!("invalid redirect target '{to}'")))?;
        let mut response = StatusCode::FOUND.into_response();
        response.headers_mut().insert(headers::X_REDIRECT, target);
        Ok(response)
    }

    /// Whether the client asked for `key` in a partial reload.
    ///
    /// Always false when the request is not a partial reload.
    #[must_use]
    pub fn check_only(&self, key: &str) -> bool {
        self.context.partial.contains(key)
    }

    /// Raw `X-Inertia-Partial-Data` value; empty when absent.
    #[must_use]
    pub fn only(&self) -> &str {
        self.context.partial.raw()
    }

    /// Parsed partial reload keys.
    #[must_use]
    pub fn partial(&self) -> &PartialReload {
        &self.context.partial
    }

    /// Whether this request is an Inertia navigation.
    #[must_use]
    pub fn is_inertia(&self) -> bool {
        self.context.kind.is_navigation()
    }

    /// This request's shared-props store.
    #[must_use]
    pub fn shared(&self) -> &SharedProps {
        &self.context.shared
    }

    /// Share a value for the rest of this request (or process, if so configured).
    pub fn share(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.shared.share(key, value);
    }

    /// Current asset version, computed at most once per request.
    pub async fn version(&self) -> Result<String> {
        self.context.version.get().await
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Inertia {
    type Rejection = InertiaError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<InertiaContext>()
            .cloned()
            .map(Inertia::new)
            .ok_or(InertiaError::MissingContext)
    }
}

fn into_props(props: impl Serialize) -> Result<Props> {
    match serde_json::to_value(props)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Props::new()),
        other => Err(InertiaError::Template(format!(
            "page props must be a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::view::RootView;
    use crate::version::{Fingerprint, VersionCell};
    use serde_json::json;
    use std::sync::Arc;

    fn context(kind: RequestKind, partial: &str) -> InertiaContext {
        let shared = SharedProps::new();
        shared.share("appName", "Demo");
        InertiaContext {
            kind,
            url: "/users?page=1".to_string(),
            partial: PartialReload::parse(partial),
            shared,
            version: VersionCell::new(Fingerprint::disabled()),
            view: Arc::new(RootView::builtin("/assets/app.js")),
        }
    }

    #[tokio::test]
    async fn test_page_merges_shared_props() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        let page = inertia
            .page("Users/Index", json!({"users": ["ann"]}))
            .await
            .unwrap();
        assert_eq!(page.component, "Users/Index");
        assert_eq!(page.url, "/users?page=1");
        assert_eq!(page.version, "__noversioning__");
        assert_eq!(
            Value::Object(page.props),
            json!({"appName": "Demo", "users": ["ann"]})
        );
    }

    #[tokio::test]
    async fn test_local_props_override_shared() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        let page = inertia.page("Home", json!({"appName": "Local"})).await.unwrap();
        assert_eq!(page.props["appName"], json!("Local"));
    }

    #[tokio::test]
    async fn test_null_props() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        let page = inertia.page("Home", ()).await.unwrap();
        assert_eq!(Value::Object(page.props), json!({"appName": "Demo"}));
    }

    #[tokio::test]
    async fn test_non_object_props_rejected() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        assert!(matches!(
            inertia.page("Home", json!([1, 2])).await,
            Err(InertiaError::Template(_))
        ));
    }

    #[tokio::test]
    async fn test_render_navigation_is_json() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        let response = inertia.render("Home", json!({})).await.unwrap();
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_render_initial_is_html() {
        let inertia = Inertia::new(context(RequestKind::InitialLoad, ""));
        let response = inertia.render("Home", json!({})).await.unwrap();
        assert!(response.headers()[http::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[test]
    fn test_check_only() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, "name,email"));
        assert!(inertia.check_only("email"));
        assert!(!inertia.check_only("age"));
        assert_eq!(inertia.only(), "name,email");

        let full = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        assert!(!full.check_only("email"));
    }

    #[test]
    fn test_redirect_sets_intent_header() {
        let inertia = Inertia::new(context(RequestKind::InertiaNavigation, ""));
        let response = inertia.redirect("/users").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[headers::X_REDIRECT], "/users");
        assert!(!response.headers().contains_key(http::header::LOCATION));
    }

    #[test]
    fn test_share_through_handle() {
        let inertia = Inertia::new(context(RequestKind::InitialLoad, ""));
        inertia.share("flash", json!({"ok": true}));
        assert_eq!(inertia.shared().get("flash.ok"), Some(json!(true)));
    }
}
