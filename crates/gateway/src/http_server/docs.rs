use axum::extract::{Json, Path, Query, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Deserialize;

use common::connector::{Connector, PageKey, ROOT_ID};

use super::{id_from_path, ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// Return the page of children starting here instead of the first one
    pub offset: Option<usize>,
}

pub async fn get_root(
    State(connector): State<Connector>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response, ApiError> {
    read(&connector, ROOT_ID.to_string(), query).await
}

pub async fn get_document(
    State(connector): State<Connector>,
    Path(path): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response, ApiError> {
    read(&connector, id_from_path(&path), query).await
}

async fn read(connector: &Connector, id: String, query: DocumentQuery) -> Result<Response, ApiError> {
    let document = match query.offset {
        Some(offset) => {
            let key = PageKey::new(id.as_str(), offset, connector.options().page_size);
            connector.get_children(&key).await?
        }
        None => connector.get_document(&id).await?,
    };

    match document {
        Some(document) => Ok((StatusCode::OK, Json(document)).into_response()),
        None => Err(ApiError::NotFound(id)),
    }
}

pub async fn remove_document(
    State(connector): State<Connector>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let id = id_from_path(&path);
    if connector.remove_document(&id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound(id))
    }
}
