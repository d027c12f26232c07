use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::SessionResponse;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::workflow::Session;

/// Which portal screen the caller should see, rebuilt from the store each time.
pub async fn get_session(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let session =
        Session::load(state.store.as_ref(), &auth.user).api_err("Failed to load session")?;

    let response = SessionResponse {
        user_id: session.user_id.clone(),
        role: session.role,
        email: auth.user.profile.email,
        full_name: auth.user.profile.full_name,
        view: session.view(),
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}
