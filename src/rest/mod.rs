//! REST API for the guide service.
//!
//! Thin HTTP glue over [`crate::guide::GuideService`]: all invariants
//! live in the core. Designed to run as a standalone server.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use openapi::ApiDoc;
pub use server::{RestApiServer, RestApiStatus};
pub use state::ApiState;

/// Default port for the REST API server
pub const DEFAULT_PORT: u16 = 7040;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/status", get(routes::health::status))
        // Sequence endpoints
        .route("/api/v1/guide/load", post(routes::guide::load))
        .route("/api/v1/guide/step", get(routes::guide::current))
        .route("/api/v1/guide/next", post(routes::guide::next))
        .route("/api/v1/guide/previous", post(routes::guide::previous))
        .route("/api/v1/guide/jump/:index", post(routes::guide::jump))
        // Advisory endpoints
        .route("/api/v1/guide/explain", get(routes::enrich::explain))
        .route(
            "/api/v1/guide/troubleshoot",
            get(routes::enrich::troubleshoot),
        )
        .route(
            "/api/v1/guide/troubleshoot/image",
            post(routes::enrich::troubleshoot_image),
        )
        // Video endpoints
        .route("/api/v1/videos/welcome", get(routes::videos::welcome))
        .route("/api/v1/videos/step/:index", get(routes::videos::step))
        .route("/api/v1/videos/help", post(routes::videos::help))
        // Avatar catalog endpoints
        .route("/api/v1/avatars", get(routes::avatars::list_avatars))
        .route("/api/v1/voices", get(routes::avatars::list_voices))
        .route(
            "/api/v1/avatars/selection",
            put(routes::avatars::select_avatar),
        )
        .route(
            "/api/v1/voices/selection",
            put(routes::avatars::select_voice),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
