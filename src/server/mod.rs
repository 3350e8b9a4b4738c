//! HTTP serving boundary
//!
//! Deliberately thin: bootstrap builds the context, this module binds it to
//! a router and serves. Content routes (pages, admin, uploads) mount here as
//! they are built; what exists today is the health/status surface.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::context::AppContext;

pub mod routes;

pub async fn start_server(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let addr: SocketAddr = ctx.config().server.listen.parse()?;

    let app = Router::new()
        .route("/healthz", get(routes::health))
        .route("/site", get(routes::site_info))
        .route("/search", get(routes::search))
        .layer(CorsLayer::permissive())
        .with_state(ctx);

    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
