use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::connector::ConnectorError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Connector(e) => match e {
                ConnectorError::InvalidIdentifier(_)
                | ConnectorError::InvalidPageKey(_)
                | ConnectorError::MissingPayload(_) => StatusCode::BAD_REQUEST,
                ConnectorError::ContentMissing { .. } => StatusCode::NOT_FOUND,
                e if e.is_transient() || e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let msg = serde_json::json!({
            "status": "failure",
            "message": self.to_string(),
        });
        (status, Json(msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(ConnectorError::ContentMissing {
            container: "bucket".into(),
            key: "a".into(),
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(ConnectorError::InvalidIdentifier(String::new()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let unavailable = ApiError::from(ConnectorError::StoreUnavailable("denied".into()));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let config = ApiError::from(ConnectorError::Config("bad".into()));
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
