use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::time::timeout;

use common::connector::{Connector, ROOT_ID};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub fn router() -> Router<Connector> {
    Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
}

async fn livez() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}

/// Ready when the container root can be listed
#[tracing::instrument(skip(connector))]
async fn readyz(State(connector): State<Connector>) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, connector.get_document(ROOT_ID)).await {
        Ok(Ok(_)) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check failed");
            let msg = serde_json::json!({
                "status": "failure",
                "message": "blob store isn't available"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
        Err(_) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "health check timed out"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}
