use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

/// Pending approvals, undelivered projects and pending invoices.
pub async fn get_stats(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let stats = state
        .store
        .dashboard_stats()
        .api_err("Failed to load dashboard stats")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(stats)))
}
