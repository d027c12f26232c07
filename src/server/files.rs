use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio_util::io::ReaderStream;

use crate::server::AppState;
use crate::storage::StorageError;

pub fn files_router() -> Router<Arc<AppState>> {
    Router::new().route("/{*path}", get(download))
}

/// Public read access to the bucket. Object paths carry a random uuid.
async fn download(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    let (file, size) = match state.storage.get(&path).await {
        Ok(result) => result,
        Err(StorageError::NotFound | StorageError::InvalidPath) => {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "File storage error");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Storage error").into_response();
        }
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
