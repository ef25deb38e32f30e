use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

use common::connector::Connector;

mod content;
mod docs;
mod error;
mod health;

pub use error::ApiError;

const STATUS_PREFIX: &str = "/_status";

/// Maximum upload size in bytes (500 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 500 * 1024 * 1024;

/// Build the gateway router: document, content and health routes
pub fn router(connector: Connector) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::PUT, Method::DELETE])
        .allow_headers(vec![ACCEPT, ORIGIN, CONTENT_TYPE])
        .allow_origin(Any)
        .allow_credentials(false);

    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .route("/docs", get(docs::get_root))
        .route(
            "/docs/*id",
            get(docs::get_document).delete(docs::remove_document),
        )
        .route(
            "/content/*id",
            get(content::download).put(content::upload),
        )
        .nest(STATUS_PREFIX, health::router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .with_state(connector)
        .layer(cors_layer)
        .layer(trace_layer)
}

/// Wildcard captures drop the leading delimiter of the id
fn id_from_path(path: &str) -> String {
    format!("/{}", path)
}
