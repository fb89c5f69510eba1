//! Shared props and CSRF example
//!
//! An upstream middleware shares the "current user" with every page, and the
//! layer issues an `XSRF-TOKEN` cookie that the client must echo on POST.
//!
//! Run with: SECURITY_KEY=change-me cargo run --example server_shared_props

use axum::{
    extract::{Extension, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use inertia_axum_http::{CsrfConfig, Inertia, InertiaConfig, InertiaLayer, Result, SharedProps};
use serde_json::json;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let secret = std::env::var("SECURITY_KEY").unwrap_or_else(|_| "change-me".to_string());
    let inertia = InertiaLayer::with_config(
        InertiaConfig::default()
            .with_versioning(false)
            .with_csrf(CsrfConfig::new(secret))
            .with_except("/health"),
    )?
    .share("appName", "Shared Props Demo");

    // `route_layer` runs inside the Inertia layer, so the store already exists.
    let routes = Router::new()
        .route("/", get(dashboard).post(save))
        .route_layer(middleware::from_fn(share_current_user))
        .route("/health", get(|| async { "ok" }));

    let app = inertia.apply(routes).layer(TraceLayer::new_for_http());

    tracing::info!("listening on http://127.0.0.1:3000");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn share_current_user(
    Extension(shared): Extension<SharedProps>,
    req: Request,
    next: Next,
) -> Response {
    shared.share("auth", json!({"user": {"name": "Ann", "role": "admin"}}));
    next.run(req).await
}

async fn dashboard(inertia: Inertia) -> Result<Response> {
    let user = inertia.shared().get("auth.user.name");
    tracing::debug!(?user, "rendering dashboard");
    inertia.render("Dashboard", json!({"widgets": ["sales", "traffic"]})).await
}

async fn save(inertia: Inertia) -> Result<Response> {
    tracing::info!("dashboard saved");
    inertia.redirect("/")
}
