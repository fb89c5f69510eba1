//! Axum middleware for the Inertia protocol.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use inertia_axum_http::InertiaLayer;
//!
//! let inertia = InertiaLayer::new().share("appName", "Demo");
//! let app = inertia.apply(Router::new().route("/users", get(users)));
//! ```
//!
//! # How It Works
//!
//! For every request not excluded by configuration the middleware:
//! 1. Removes `X-Requested-With`
//! 2. Entry hook: rejects state-changing requests without a valid CSRF token (400)
//! 3. Attaches an [`InertiaContext`] and the [`SharedProps`] store to request extensions
//! 4. Runs the inner service
//! 5. Promotes `X-Redirect` to `Location`
//! 6. Exit hook: runs the [negotiation pipeline](super::negotiate)
//! 7. On initial loads with CSRF enabled, issues a fresh token cookie

use super::config::{InertiaConfig, SharedScope};
use super::csrf::CsrfBridge;
use super::negotiate::{self, Outcome, RequestInfo};
use super::shared::SharedProps;
use super::view::RootView;
use crate::error::{InertiaError, Result};
use crate::protocol::{self, constants::headers};
use crate::types::{PartialReload, Props, RequestKind};
use crate::version::{Fingerprint, VersionCell};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use futures::future::BoxFuture;
use http::header;
use serde_json::Value;
use std::sync::Arc;

/// Per-request Inertia state, stored in request extensions.
///
/// Built once per request by the middleware; handlers normally go through the
/// [`Inertia`](crate::Inertia) extractor instead of reading it directly.
#[derive(Clone, Debug)]
pub struct InertiaContext {
    /// Initial load or navigation.
    pub kind: RequestKind,
    /// Request path and query, as reported in the page object.
    pub url: String,
    /// Requested partial reload keys.
    pub partial: PartialReload,
    /// Shared props store for this request.
    pub shared: SharedProps,
    /// Request-lifetime version cache, shared with the exit hook.
    pub version: VersionCell,
    /// Root view used on initial loads.
    pub view: Arc<RootView>,
}

/// Axum middleware layer implementing the Inertia protocol.
///
/// Cheap to clone; all clones share configuration, root view and CSRF bridge.
///
/// # Configuration
///
/// ```ignore
/// use inertia_axum_http::{CsrfConfig, InertiaConfig, InertiaLayer};
///
/// let layer = InertiaLayer::with_config(
///     InertiaConfig::default()
///         .with_assets_dirs(["@webroot/build"])
///         .with_csrf(CsrfConfig::new(std::env::var("SECURITY_KEY")?)),
/// )?;
/// ```
#[derive(Clone)]
pub struct InertiaLayer {
    inner: Arc<Inner>,
}

#[derive(Clone)]
struct Inner {
    config: InertiaConfig,
    view: Arc<RootView>,
    fingerprint: Fingerprint,
    csrf: Option<CsrfBridge>,
    shared_defaults: Props,
}

impl InertiaLayer {
    /// Layer with default configuration and the built-in root view.
    ///
    /// Defaults: versioning over `public/assets`, request-scoped shared props,
    /// CSRF off.
    #[must_use]
    pub fn new() -> Self {
        let config = InertiaConfig::default();
        let dirs = config
            .assets_dirs
            .iter()
            .filter_map(|dir| config.resolve_path(dir).ok())
            .collect::<Vec<_>>();
        let view = Arc::new(RootView::builtin(&config.entry_script));
        Self::from_parts(config, view, Fingerprint::new(dirs), None)
    }

    /// Layer with custom configuration.
    ///
    /// Resolves asset directories, loads the root view and builds the CSRF
    /// bridge up front, so misconfiguration surfaces at startup.
    ///
    /// # Arguments
    ///
    /// * `config` - Adapter configuration
    ///
    /// # Errors
    ///
    /// Fails when asset paths cannot be resolved, the root view cannot be
    /// loaded, or the CSRF configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use inertia_axum_http::{InertiaConfig, InertiaLayer};
    ///
    /// let layer = InertiaLayer::with_config(
    ///     InertiaConfig::default()
    ///         .with_versioning(false)
    ///         .with_except("/health"),
    /// )
    /// .unwrap();
    /// assert!(!layer.fingerprint().is_enabled());
    /// ```
    pub fn with_config(config: InertiaConfig) -> Result<Self> {
        let view = match &config.view {
            Some(path) => RootView::load(path)?,
            None => RootView::builtin(&config.entry_script),
        };
        let fingerprint = if config.use_versioning {
            Fingerprint::new(config.resolved_assets_dirs()?)
        } else {
            Fingerprint::disabled()
        };
        let csrf = config.csrf.as_ref().map(CsrfBridge::new).transpose()?;
        Ok(Self::from_parts(config, Arc::new(view), fingerprint, csrf))
    }

    fn from_parts(
        config: InertiaConfig,
        view: Arc<RootView>,
        fingerprint: Fingerprint,
        csrf: Option<CsrfBridge>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                view,
                fingerprint,
                csrf,
                shared_defaults: Props::new(),
            }),
        }
    }

    /// Replace the root view.
    #[must_use]
    pub fn with_view(mut self, view: RootView) -> Self {
        self.inner_mut().view = Arc::new(view);
        self
    }

    /// Share a value with every request served by this layer.
    ///
    /// With request scope the value seeds each request's store; with process
    /// scope it is written into the process store once, when the middleware is
    /// built.
    #[must_use]
    pub fn share(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner_mut()
            .shared_defaults
            .insert(key.into(), value.into());
        self
    }

    /// The layer's configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InertiaConfig {
        &self.inner.config
    }

    /// The layer's fingerprint settings.
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.inner.fingerprint
    }

    /// Compute the current asset version.
    pub async fn version(&self) -> Result<String> {
        self.inner.fingerprint.compute_async().await
    }

    /// Create the middleware function for `axum::middleware::from_fn`.
    ///
    /// With process scope, layer-level shared props are written into the
    /// process store here, once.
    ///
    /// # Returns
    ///
    /// A cloneable function that runs the entry hook, attaches the
    /// [`InertiaContext`] and [`SharedProps`] to request extensions, calls the
    /// inner service and then runs the exit hook.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use axum::{middleware::from_fn, routing::get, Router};
    /// use inertia_axum_http::InertiaLayer;
    ///
    /// let inertia = InertiaLayer::new();
    /// let app = Router::new()
    ///     .route("/", get(home))
    ///     .layer(from_fn(inertia.middleware()));
    /// ```
    #[must_use]
    pub fn middleware(
        &self,
    ) -> impl Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync + Clone + 'static
    {
        let inner = Arc::clone(&self.inner);
        if inner.config.shared_scope == SharedScope::Process && !inner.shared_defaults.is_empty() {
            SharedProps::process(&inner.config.share_key).share_many(inner.shared_defaults.clone());
        }

        move |req: Request, next: Next| -> BoxFuture<'static, Response> {
            let inner = Arc::clone(&inner);
            Box::pin(async move { inner.handle(req, next).await })
        }
    }

    /// Wrap every route of `router` with this layer.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(axum::middleware::from_fn(self.middleware()))
    }

    fn inner_mut(&mut self) -> &mut Inner {
        // Copy-on-write, so builders never affect layers cloned earlier.
        Arc::make_mut(&mut self.inner)
    }
}

impl Default for InertiaLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InertiaLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InertiaLayer")
            .field("config", &self.inner.config)
            .field("fingerprint", &self.inner.fingerprint)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn shared_store(&self) -> SharedProps {
        match self.config.shared_scope {
            SharedScope::Request => SharedProps::with_props(self.shared_defaults.clone()),
            SharedScope::Process => SharedProps::process(&self.config.share_key),
        }
    }

    async fn handle(&self, mut req: Request, next: Next) -> Response {
        if self.config.is_excluded(req.uri().path()) {
            return next.run(req).await;
        }

        req.headers_mut().remove(headers::X_REQUESTED_WITH);

        if let Err(err) = self.before_request(&req) {
            return err.into_response();
        }

        let info = RequestInfo::capture(req.method(), req.uri(), req.headers(), &self.config.scheme);
        let version = VersionCell::new(self.fingerprint.clone());
        let shared = self.shared_store();
        let context = InertiaContext {
            kind: info.kind,
            url: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.uri().path().to_string()),
            partial: PartialReload::from_headers(req.headers()),
            shared: shared.clone(),
            version: version.clone(),
            view: Arc::clone(&self.view),
        };
        tracing::debug!(kind = ?info.kind, method = %info.method, url = %context.url, "inertia request");

        req.extensions_mut().insert(context);
        req.extensions_mut().insert(shared);

        let mut response = next.run(req).await;

        if negotiate::promote_redirect(response.headers_mut()) {
            tracing::debug!("promoted X-Redirect to Location");
        }

        match self.before_send(&info, &version, response).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }

    /// Entry hook.
    fn before_request(&self, req: &Request) -> Result<()> {
        let Some(csrf) = &self.csrf else {
            return Ok(());
        };
        if !protocol::is_state_changing(req.method()) {
            return Ok(());
        }
        csrf.verify(req.headers()).inspect_err(|_| {
            tracing::warn!(method = %req.method(), path = req.uri().path(), "CSRF verification failed");
        })
    }

    /// Exit hook.
    async fn before_send(
        &self,
        info: &RequestInfo,
        version: &VersionCell,
        response: Response,
    ) -> Result<Response> {
        let server_version = if info.needs_version() {
            Some(version.get().await?)
        } else {
            None
        };

        let (mut response, outcome) =
            negotiate::negotiate(info, response, server_version.as_deref());

        if outcome == Outcome::InitialLoad {
            if let Some(csrf) = &self.csrf {
                let issued = csrf.issue()?;
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, issued.set_cookie);
            }
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer() {
        let layer = InertiaLayer::new();
        assert!(layer.fingerprint().is_enabled());
        assert_eq!(
            layer.fingerprint().dirs(),
            [std::path::PathBuf::from("public/assets")]
        );
        assert!(layer.inner.csrf.is_none());
    }

    #[test]
    fn test_versioning_disabled() {
        let layer =
            InertiaLayer::with_config(InertiaConfig::default().with_versioning(false)).unwrap();
        assert!(!layer.fingerprint().is_enabled());
    }

    #[test]
    fn test_invalid_csrf_config() {
        let config = InertiaConfig::default().with_csrf(crate::CsrfConfig::default());
        assert!(matches!(
            InertiaLayer::with_config(config),
            Err(InertiaError::Config(_))
        ));
    }

    #[test]
    fn test_missing_view_file() {
        let config = InertiaConfig::default().with_view("/nonexistent/root.html");
        assert!(matches!(
            InertiaLayer::with_config(config),
            Err(InertiaError::Template(_))
        ));
    }

    #[test]
    fn test_share_after_clone_does_not_leak() {
        let base = InertiaLayer::new();
        let keep = base.clone();
        let extended = base.share("k", 1);
        assert!(keep.inner.shared_defaults.is_empty());
        assert_eq!(extended.inner.shared_defaults.len(), 1);
    }
}
