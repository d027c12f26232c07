mod access;
mod contracts;
mod onboarding;
mod projects;
mod session;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn client_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(session::get_session))
        // Onboarding
        .route(
            "/onboarding",
            get(onboarding::get_onboarding).put(onboarding::submit_onboarding),
        )
        // Contracts
        .route("/contracts", get(contracts::list_contracts))
        .route("/contracts/{id}", get(contracts::get_contract))
        .route("/contracts/{id}/sign", post(contracts::sign_contract))
        // Dashboard
        .route("/projects", get(projects::list_projects))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}/milestones", get(projects::list_milestones))
        .route("/projects/{id}/invoices", get(projects::list_invoices))
        .route(
            "/projects/{id}/deliverables",
            get(projects::list_deliverables),
        )
        .route(
            "/projects/{id}/messages",
            get(projects::list_messages).post(projects::send_message),
        )
        .route(
            "/projects/{id}/messages/read",
            post(projects::mark_messages_read),
        )
        .route(
            "/projects/{id}/messages/stream",
            get(projects::stream_messages),
        )
        .route(
            "/projects/{id}/approvals",
            get(projects::list_approvals).post(projects::create_approval),
        )
}
