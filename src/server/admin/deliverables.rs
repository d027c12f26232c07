use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::load_project;
use super::projects::non_blank;
use crate::auth::RequireAdmin;
use crate::notify::NotificationKind;
use crate::server::AppState;
use crate::server::dto::{CreateDeliverableRequest, UpdateDeliverableRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::storage::object_path;
use crate::types::Deliverable;
use crate::workflow::{DEFAULT_FILE_TYPE, DeliverableDraft, next_version, validate_draft};

const DELIVERABLE_FOLDER: &str = "deliverables";

pub async fn create_deliverable(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeliverableRequest>,
) -> impl IntoResponse {
    validate_draft(&DeliverableDraft {
        project_id: &req.project_id,
        title: &req.title,
        has_file: req.file_url.as_deref().is_some_and(|u| !u.trim().is_empty()),
        external_link: req.external_link.as_deref(),
    })?;

    let deliverable = insert_deliverable(&state, req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(deliverable))))
}

struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Multipart variant: a `file` part plus the same text fields as the JSON route.
pub async fn upload_deliverable(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut req = CreateDeliverableRequest {
        project_id: String::new(),
        title: String::new(),
        description: None,
        file_url: None,
        external_link: None,
        file_type: None,
    };
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("file").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
            if !bytes.is_empty() {
                file = Some(UploadedFile {
                    name: filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid field {name}: {e}")))?;
        match name.as_str() {
            "project_id" => req.project_id = value,
            "title" => req.title = value,
            "description" => req.description = Some(value),
            "external_link" => req.external_link = Some(value),
            "file_type" => req.file_type = Some(value),
            _ => {}
        }
    }

    validate_draft(&DeliverableDraft {
        project_id: &req.project_id,
        title: &req.title,
        has_file: file.is_some(),
        external_link: req.external_link.as_deref(),
    })?;
    load_project(&state, req.project_id.trim())?;

    if let Some(file) = file {
        let path = object_path(DELIVERABLE_FOLDER, admin.user.id(), &file.name)
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        state
            .storage
            .put(&path, &file.bytes)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        tracing::info!(path = %path, bytes = file.bytes.len(), "Stored deliverable file");
        req.file_url = Some(state.public_url(&headers, &path));
    }

    let deliverable = insert_deliverable(&state, req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(deliverable))))
}

pub async fn list_deliverables(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let deliverables = state
        .store
        .list_deliverables()
        .api_err("Failed to list deliverables")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(deliverables)))
}

pub async fn update_deliverable(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDeliverableRequest>,
) -> impl IntoResponse {
    let mut deliverable = load_deliverable(&state, &id)?;
    let now = Utc::now();

    let file_url = non_blank(req.file_url);
    let external_link = non_blank(req.external_link);
    deliverable.version = next_version(&deliverable, file_url.as_deref(), external_link.as_deref());

    if let Some(title) = req.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::bad_request("Title is required"));
        }
        deliverable.title = title.to_string();
    }
    if let Some(description) = req.description {
        deliverable.description = non_blank(Some(description));
    }
    if let Some(url) = file_url {
        deliverable.file_url = Some(url);
    }
    if let Some(link) = external_link {
        deliverable.external_link = Some(link);
    }
    if let Some(file_type) = non_blank(req.file_type) {
        deliverable.file_type = Some(file_type);
    }
    if let Some(delivered) = req.is_delivered {
        if delivered != deliverable.is_delivered {
            deliverable.delivered_at = delivered.then_some(now);
        }
        deliverable.is_delivered = delivered;
    }
    deliverable.updated_at = now;

    state
        .store
        .update_deliverable(&deliverable)
        .api_err("Failed to update deliverable")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(deliverable)))
}

pub async fn delete_deliverable(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_deliverable(&id)
        .api_err("Failed to delete deliverable")?;
    if !deleted {
        return Err(ApiError::not_found("Deliverable not found"));
    }

    tracing::info!(deliverable_id = %id, "Deleted deliverable");
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Records a validated draft as delivered and tells the client about it.
fn insert_deliverable(
    state: &AppState,
    req: CreateDeliverableRequest,
) -> Result<Deliverable, ApiError> {
    let project = load_project(state, req.project_id.trim())?;

    let now = Utc::now();
    let deliverable = Deliverable {
        id: Uuid::new_v4().to_string(),
        project_id: project.id,
        title: req.title.trim().to_string(),
        description: non_blank(req.description),
        file_url: non_blank(req.file_url),
        file_type: non_blank(req.file_type).or_else(|| Some(DEFAULT_FILE_TYPE.to_string())),
        external_link: non_blank(req.external_link),
        version: 1,
        is_delivered: true,
        delivered_at: Some(now),
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_deliverable(&deliverable)
        .api_err("Failed to create deliverable")?;

    tracing::info!(
        deliverable_id = %deliverable.id,
        project_id = %deliverable.project_id,
        "Delivered file"
    );

    let mut data = Map::new();
    data.insert("title".to_string(), Value::String(deliverable.title.clone()));
    state.notify(NotificationKind::DeliverableSent, &project.client_id, data);

    Ok(deliverable)
}

fn load_deliverable(state: &AppState, id: &str) -> Result<Deliverable, ApiError> {
    state
        .store
        .get_deliverable(id)
        .api_err("Failed to get deliverable")?
        .or_not_found("Deliverable not found")
}
