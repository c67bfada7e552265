//! HTTP surface: routing, handlers and error mapping.
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::storage::Database;

mod articles;
mod docs;
mod error;
mod health;
mod price_lists;

pub use articles::{ListParams, UpsertRequest};
pub use docs::openapi_document;
pub use error::ApiError;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application router around an injected database handle.
///
/// Cross-origin requests are allowed from any origin.
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        .route("/api-docs", get(docs::api_docs))
        .route("/api/articulos", get(articles::list).post(articles::create))
        .route("/api/articulos/upsert", post(articles::upsert))
        .route("/api/articulos/upsert/bulk", post(articles::upsert_bulk))
        .route(
            "/api/articulos/{codart}",
            get(articles::get)
                .put(articles::update)
                .delete(articles::delete),
        )
        .route("/api/listas", get(price_lists::list))
        .route("/api/listas/{codlis}", get(price_lists::get))
        .fallback(health::not_found)
        .layer(CorsLayer::permissive())
        .with_state(db)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(server: &ServerConfig, db: Database) -> Result<(), ServeError> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;

    tracing::info!(address = %local, "Server listening");
    tracing::info!("Documentation available at http://{local}/api-docs");
    tracing::info!("Health check available at http://{local}/health");

    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
