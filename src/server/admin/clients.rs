use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::Map;

use crate::auth::RequireAdmin;
use crate::notify::NotificationKind;
use crate::server::AppState;
use crate::server::dto::{ClientApplicationResponse, ClientListParams};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{ApprovalStatus, ClientOnboarding};

/// Onboarding applications, newest first, optionally filtered by approval status.
pub async fn list_clients(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientListParams>,
) -> impl IntoResponse {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(s) => Some(
            ApprovalStatus::parse(s)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid status: {s}")))?,
        ),
    };

    let rows = state
        .store
        .list_onboarding(status)
        .api_err("Failed to list clients")?;

    let mut responses = Vec::with_capacity(rows.len());
    for onboarding in rows {
        responses.push(with_profile(&state, onboarding)?);
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn approve_client(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let onboarding = set_status(&state, &user_id, ApprovalStatus::Approved)?;

    state.notify(NotificationKind::ClientApproved, &user_id, Map::new());

    Ok::<_, ApiError>(Json(ApiResponse::success(onboarding)))
}

pub async fn reject_client(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let onboarding = set_status(&state, &user_id, ApprovalStatus::Rejected)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(onboarding)))
}

fn set_status(
    state: &AppState,
    user_id: &str,
    status: ApprovalStatus,
) -> Result<ClientApplicationResponse, ApiError> {
    let approved_at = (status == ApprovalStatus::Approved).then(Utc::now);

    let updated = state
        .store
        .set_approval_status(user_id, status, approved_at)
        .api_err("Failed to update client status")?;
    if !updated {
        return Err(ApiError::not_found("Client application not found"));
    }

    tracing::info!(user_id, status = %status, "Client application reviewed");

    let onboarding = state
        .store
        .get_onboarding(user_id)
        .api_err("Failed to get client application")?
        .or_not_found("Client application not found")?;

    with_profile(state, onboarding)
}

fn with_profile(
    state: &AppState,
    onboarding: ClientOnboarding,
) -> Result<ClientApplicationResponse, ApiError> {
    let profile = state
        .store
        .get_profile(&onboarding.user_id)
        .api_err("Failed to get profile")?;

    Ok(ClientApplicationResponse {
        email: profile.as_ref().map(|p| p.email.clone()),
        full_name: profile.and_then(|p| p.full_name),
        onboarding,
    })
}
