//! Basic Inertia server example
//!
//! Serves one page component, the client bundle from `public/assets`, and a
//! delete endpoint that redirects back (302 becomes 303 for Inertia clients).
//!
//! Run with: cargo run --example server_basic

use axum::{
    extract::Path,
    response::Response,
    routing::{delete, get},
    Router,
};
use inertia_axum_http::{Inertia, InertiaConfig, InertiaLayer, Result};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let inertia = InertiaLayer::with_config(
        InertiaConfig::default()
            .with_alias("@webroot", "public")
            .with_assets_dirs(["@webroot/assets"]),
    )?;

    let app = inertia
        .apply(
            Router::new()
                .route("/", get(home))
                .route("/users", get(users))
                .route("/users/{id}", delete(destroy_user)),
        )
        .nest_service("/assets", ServeDir::new("public/assets"))
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on http://127.0.0.1:3000");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn home(inertia: Inertia) -> Result<Response> {
    inertia.render("Home", json!({"greeting": "Hello from Axum"})).await
}

async fn users(inertia: Inertia) -> Result<Response> {
    let mut props = json!({
        "users": [
            {"id": 1, "name": "Ann"},
            {"id": 2, "name": "Bob"},
        ],
    });
    // Only computed when the client asks for it in a partial reload.
    if inertia.check_only("stats") {
        props["stats"] = json!({"total": 2});
    }
    inertia.render("Users/Index", props).await
}

async fn destroy_user(Path(id): Path<u64>, inertia: Inertia) -> Result<Response> {
    tracing::info!(id, "deleting user");
    inertia.redirect("/users")
}
