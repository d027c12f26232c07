use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use super::projects::non_blank;
use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::UpdateMilestoneRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_title;

pub async fn update_milestone(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMilestoneRequest>,
) -> impl IntoResponse {
    let mut milestone = state
        .store
        .get_milestone(&id)
        .api_err("Failed to get milestone")?
        .or_not_found("Milestone not found")?;
    let now = Utc::now();

    if let Some(title) = req.title {
        milestone.title = validate_title(&title, "Milestone title")?;
    }
    if let Some(description) = req.description {
        milestone.description = non_blank(Some(description));
    }
    if let Some(status) = req.status {
        milestone.status = status;
    }
    if let Some(due_date) = req.due_date {
        milestone.due_date = non_blank(Some(due_date));
    }
    if let Some(order) = req.sort_order {
        milestone.sort_order = order;
    }
    if let Some(completed) = req.is_completed {
        if completed != milestone.is_completed {
            milestone.completed_at = completed.then_some(now);
        }
        milestone.is_completed = completed;
    }
    milestone.updated_at = now;

    state
        .store
        .update_milestone(&milestone)
        .api_err("Failed to update milestone")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(milestone)))
}

pub async fn delete_milestone(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_milestone(&id)
        .api_err("Failed to delete milestone")?;
    if !deleted {
        return Err(ApiError::not_found("Milestone not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
