use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::auth::RequireClient;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::IntakeSubmission;
use crate::workflow::validate_intake;

pub async fn get_onboarding(
    client: RequireClient,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let onboarding = state
        .store
        .get_onboarding(client.user.id())
        .api_err("Failed to get onboarding")?
        .or_not_found("Onboarding not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(onboarding)))
}

/// Intake answers are accepted once. Later submissions are rejected.
pub async fn submit_onboarding(
    client: RequireClient,
    State(state): State<Arc<AppState>>,
    Json(intake): Json<IntakeSubmission>,
) -> impl IntoResponse {
    validate_intake(&intake)?;
    let user_id = client.user.id();

    let existing = state
        .store
        .get_onboarding(user_id)
        .api_err("Failed to get onboarding")?
        .or_not_found("Onboarding not found")?;
    if existing.is_submitted() {
        return Err(ApiError::conflict("Application already submitted"));
    }

    let submitted = state
        .store
        .submit_onboarding(user_id, &intake, Utc::now())
        .api_err("Failed to submit onboarding")?;
    if !submitted {
        return Err(ApiError::conflict("Application already submitted"));
    }

    tracing::info!(user_id, "Client submitted intake");

    let onboarding = state
        .store
        .get_onboarding(user_id)
        .api_err("Failed to get onboarding")?
        .or_not_found("Onboarding not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(onboarding)))
}
