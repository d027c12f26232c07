use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use super::access::owned_project;
use crate::auth::RequireActiveClient;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateApprovalRequest, InvoiceResponse, MarkReadResponse, SendMessageRequest,
};
use crate::server::messages;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::{ApprovalType, MilestoneApproval, Project};
use crate::workflow::approval_checklist;

pub async fn list_projects(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let projects: Vec<Project> = state
        .store
        .list_client_projects(client.user.id())
        .api_err("Failed to list projects")?
        .into_iter()
        .map(Project::for_client)
        .collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(projects)))
}

pub async fn get_project(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(project.for_client())))
}

pub async fn list_milestones(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let milestones = state
        .store
        .list_project_milestones(&project.id)
        .api_err("Failed to list milestones")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(milestones)))
}

pub async fn list_invoices(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let invoices: Vec<InvoiceResponse> = state
        .store
        .list_project_invoices(&project.id)
        .api_err("Failed to list invoices")?
        .into_iter()
        .map(InvoiceResponse::from)
        .collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(invoices)))
}

/// Delivered files only, newest first.
pub async fn list_deliverables(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let deliverables = state
        .store
        .list_project_deliverables(&project.id, true)
        .api_err("Failed to list deliverables")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(deliverables)))
}

pub async fn list_messages(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let messages = messages::list(&state, &project.id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(messages)))
}

pub async fn send_message(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let message = messages::send(&state, &project.id, client.user.id(), &req.content)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(message))))
}

/// Marks the studio's messages in this project as read.
pub async fn mark_messages_read(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let updated = state
        .store
        .mark_messages_read(&project.id, client.user.id())
        .api_err("Failed to mark messages read")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(MarkReadResponse { updated })))
}

pub async fn stream_messages(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    Ok::<_, ApiError>(messages::stream(&state, &project.id))
}

pub async fn list_approvals(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;
    let approvals = state
        .store
        .list_project_approvals(&project.id)
        .api_err("Failed to list approvals")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(approval_checklist(&approvals))))
}

/// Records a sign-off. Each approval type can be given once per project.
pub async fn create_approval(
    client: RequireActiveClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateApprovalRequest>,
) -> impl IntoResponse {
    let approval_type: ApprovalType = req.approval_type.trim().parse()?;
    let project = owned_project(state.store.as_ref(), &client.user, &id)?;

    let approval = MilestoneApproval {
        id: Uuid::new_v4().to_string(),
        project_id: project.id,
        approval_type,
        approved_by: client.user.id().to_string(),
        notes: req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        approved_at: Utc::now(),
    };

    match state.store.create_approval(&approval) {
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict(format!(
                "{} has already been given",
                approval_type
            )));
        }
        result => result.api_err("Failed to record approval")?,
    }

    tracing::info!(
        project_id = %approval.project_id,
        approval_type = %approval_type,
        "Recorded approval"
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(approval))))
}
