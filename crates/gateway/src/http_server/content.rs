use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};

use common::connector::{
    child_name, content_id, is_content_id, parent_id, Connector, Document, PrimaryType,
    JCR_MIME_TYPE,
};

use super::{id_from_path, ApiError};

/// Accepts either a file id or its content id
fn resolve_content_id(path: &str) -> String {
    let id = id_from_path(path);
    if is_content_id(&id) {
        id
    } else {
        content_id(&id)
    }
}

/// Stream the payload of a file
pub async fn download(
    State(connector): State<Connector>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let id = resolve_content_id(&path);
    let document = connector
        .get_document(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    let binary = document
        .binary()
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;

    let content_type = match document.property(JCR_MIME_TYPE).and_then(|v| v.as_str()) {
        Some(mime) => mime.to_string(),
        None => {
            let file_id = parent_id(&id).unwrap_or_default();
            mime_guess::from_path(child_name(&file_id))
                .first_or_octet_stream()
                .to_string()
        }
    };

    let stream = binary.open_stream().await?;
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Store the request body as the payload of a file
pub async fn upload(
    State(connector): State<Connector>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = resolve_content_id(&path);
    let mut document = Document::new(id.as_str(), PrimaryType::Resource).with_binary(body);
    if let Some(mime) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        document.set_property(JCR_MIME_TYPE, mime);
    }

    connector.store_document(document).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
