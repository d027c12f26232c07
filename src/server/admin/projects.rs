use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::load_project;
use crate::auth::RequireAdmin;
use crate::notify::{NotificationData, NotificationKind};
use crate::server::AppState;
use crate::server::dto::{
    AdminProjectResponse, CreateMilestoneRequest, CreateProjectRequest, LaunchSummaryResponse,
    SendMessageRequest, UpdateProjectRequest,
};
use crate::server::messages;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{parse_launch_date, require, validate_title};
use crate::types::{Milestone, Project, ProjectStatus, Role, User};
use crate::workflow::{StatusEffect, approval_checklist, status_effect, support_plan_details};

pub async fn create_project(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let name = validate_title(&req.name, "Project name")?;
    let client = load_client(&state, &req.client_id)?;

    let project = Project::new(client.id(), &name, non_blank(req.description), Utc::now());
    state
        .store
        .create_project(&project)
        .api_err("Failed to create project")?;

    tracing::info!(project_id = %project.id, client_id = %client.id(), "Created project");

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(with_client(&state, project)?)),
    ))
}

pub async fn list_projects(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let projects = state
        .store
        .list_projects()
        .api_err("Failed to list projects")?;

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        responses.push(with_client(&state, project)?);
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_project(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(with_client(&state, project)?)))
}

/// Applies any subset of fields, then notifies the client about status changes.
pub async fn update_project(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    let mut project = load_project(&state, &id)?;
    let previous_status = project.status;

    if let Some(name) = req.name {
        project.name = validate_title(&name, "Project name")?;
    }
    if let Some(description) = req.description {
        project.description = non_blank(Some(description));
    }
    if let Some(status) = req.status {
        project.status = status;
    }
    if let Some(health) = req.health_status {
        project.health_status = health;
    }
    if let Some(waiting_on) = req.waiting_on {
        project.waiting_on = waiting_on;
    }
    if let Some(plan) = req.support_plan {
        project.support_plan = plan;
    }
    if let Some(notes) = req.internal_notes {
        project.internal_notes = non_blank(Some(notes));
    }
    if let Some(launch_date) = req.launch_date {
        project.launch_date = parse_launch_date(launch_date.as_deref())?;
    }
    if let Some(notes) = req.launch_notes {
        project.launch_notes = non_blank(Some(notes));
    }
    project.updated_at = Utc::now();

    state
        .store
        .update_project(&project)
        .api_err("Failed to update project")?;

    match status_effect(previous_status, req.status) {
        Some(StatusEffect::Completed) => {
            state.notify(
                NotificationKind::ProjectCompleted,
                &project.client_id,
                Map::new(),
            );
        }
        Some(StatusEffect::Updated(status)) => {
            state.notify(
                NotificationKind::ProjectUpdated,
                &project.client_id,
                status_data(status),
            );
        }
        None => {}
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(with_client(&state, project)?)))
}

pub async fn launch_summary(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    let client = state
        .store
        .get_profile(&project.client_id)
        .api_err("Failed to get client profile")?;

    let deliverables = state
        .store
        .list_project_deliverables(&project.id, true)
        .api_err("Failed to list deliverables")?;
    let approvals = state
        .store
        .list_project_approvals(&project.id)
        .api_err("Failed to list approvals")?;

    let summary = LaunchSummaryResponse {
        support_plan: support_plan_details(project.support_plan),
        client_email: client.as_ref().map(|p| p.email.clone()),
        client_name: client.and_then(|p| p.full_name),
        deliverables,
        approvals: approval_checklist(&approvals),
        project,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(summary)))
}

pub async fn create_milestone(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateMilestoneRequest>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    let title = validate_title(&req.title, "Milestone title")?;

    let sort_order = match req.sort_order {
        Some(order) => order,
        None => state
            .store
            .list_project_milestones(&project.id)
            .api_err("Failed to list milestones")?
            .iter()
            .map(|m| m.sort_order + 1)
            .max()
            .unwrap_or(0),
    };

    let now = Utc::now();
    let milestone = Milestone {
        id: Uuid::new_v4().to_string(),
        project_id: project.id,
        title,
        description: non_blank(req.description),
        status: req.status.unwrap_or_default(),
        due_date: non_blank(req.due_date),
        is_completed: false,
        completed_at: None,
        sort_order,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_milestone(&milestone)
        .api_err("Failed to create milestone")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(milestone))))
}

pub async fn list_messages(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    let messages = messages::list(&state, &project.id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(messages)))
}

pub async fn send_message(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    let message = messages::send(&state, &project.id, admin.user.id(), &req.content)?;

    state.notify(
        NotificationKind::MessageReceived,
        &project.client_id,
        Map::new(),
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(message))))
}

pub async fn stream_messages(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = load_project(&state, &id)?;
    Ok::<_, ApiError>(messages::stream(&state, &project.id))
}

/// Resolves a user id that must belong to a client account.
pub(super) fn load_client(state: &AppState, client_id: &str) -> Result<User, ApiError> {
    let client_id = require(client_id, "Client")?;
    let user = state
        .store
        .get_user(client_id)
        .api_err("Failed to get client")?
        .or_not_found("Client not found")?;

    if user.role != Role::Client {
        return Err(ApiError::bad_request("User is not a client"));
    }
    Ok(user)
}

pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn with_client(state: &AppState, project: Project) -> Result<AdminProjectResponse, ApiError> {
    let profile = state
        .store
        .get_profile(&project.client_id)
        .api_err("Failed to get client profile")?;

    Ok(AdminProjectResponse {
        client_email: profile.as_ref().map(|p| p.email.clone()),
        client_name: profile.and_then(|p| p.full_name),
        project,
    })
}

fn status_data(status: ProjectStatus) -> NotificationData {
    let mut data = Map::new();
    data.insert(
        "status".to_string(),
        Value::String(status.as_str().to_string()),
    );
    data
}
