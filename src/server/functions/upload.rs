use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::HeaderMap,
    response::IntoResponse,
};

use super::FunctionError;
use crate::auth::{AuthError, RequireAuth};
use crate::server::AppState;
use crate::server::dto::UploadResponse;
use crate::storage::{DEFAULT_FOLDER, object_path};

/// Stores one file under `{folder}/{user_id}/` and returns where it can be fetched.
pub async fn upload_file(
    auth: Result<RequireAuth, AuthError>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, FunctionError> {
    let auth = auth?;
    let mut multipart = multipart.map_err(|e| FunctionError::bad_request(e.body_text()))?;

    let mut folder = DEFAULT_FOLDER.to_string();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FunctionError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FunctionError::bad_request(format!("Failed to read file: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            "folder" => {
                folder = field
                    .text()
                    .await
                    .map_err(|e| FunctionError::bad_request(format!("Invalid folder: {e}")))?;
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(FunctionError::bad_request("No file provided"));
    };

    let path = object_path(&folder, auth.user.id(), &filename)
        .map_err(|e| FunctionError::bad_request(e.to_string()))?;

    state.storage.put(&path, &bytes).await.map_err(|e| {
        tracing::warn!(path = %path, error = %e, "Upload failed");
        FunctionError::bad_request(e.to_string())
    })?;

    tracing::info!(path = %path, bytes = bytes.len(), user_id = %auth.user.id(), "Stored upload");

    Ok(Json(UploadResponse {
        public_url: state.public_url(&headers, &path),
        path,
    }))
}
