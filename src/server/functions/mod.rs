//! Function endpoints. These answer with bare JSON objects instead of the
//! `{data, error}` envelope used under `/api/v1`.

mod notification;
mod upload;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::server::AppState;

pub fn functions_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/send-notification",
            post(notification::send_notification),
        )
        .route("/upload-file", post(upload::upload_file))
}

/// Error body for function endpoints: `{"error": "..."}`.
pub struct FunctionError {
    status: StatusCode,
    message: String,
}

impl FunctionError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<AuthError> for FunctionError {
    fn from(e: AuthError) -> Self {
        let (status, message) = e.status_and_message();
        Self::new(status, message)
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
