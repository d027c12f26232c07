use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use super::FunctionError;
use crate::auth::{AuthError, RequireAdmin};
use crate::notify::{NotificationKind, NotifyError};
use crate::server::AppState;
use crate::server::dto::{SendNotificationRequest, SendNotificationResponse};

/// Sends one client email synchronously and returns the provider's reply.
pub async fn send_notification(
    admin: Result<RequireAdmin, AuthError>,
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, FunctionError> {
    admin?;
    let Json(req) = body.map_err(|e| FunctionError::bad_request(e.body_text()))?;

    let kind = NotificationKind::parse(req.kind.trim()).ok_or_else(|| {
        FunctionError::bad_request(format!("Unknown notification type: {}", req.kind))
    })?;
    if req.client_id.trim().is_empty() {
        return Err(FunctionError::bad_request("clientId is required"));
    }
    let data = req.data.unwrap_or_default();

    let email_response = state
        .notifier
        .send(kind, req.client_id.trim(), &data)
        .await
        .map_err(|e| match e {
            NotifyError::ProfileNotFound => {
                FunctionError::new(StatusCode::NOT_FOUND, e.to_string())
            }
            NotifyError::Store(_) => {
                tracing::error!(error = %e, "Notification lookup failed");
                FunctionError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            other => {
                tracing::warn!(kind = %kind, error = %other, "Notification send failed");
                FunctionError::new(StatusCode::BAD_GATEWAY, other.to_string())
            }
        })?;

    Ok(Json(SendNotificationResponse {
        success: true,
        email_response,
    }))
}
