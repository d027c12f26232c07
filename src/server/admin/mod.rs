mod clients;
mod contracts;
mod deliverables;
mod invoices;
mod milestones;
mod projects;
mod stats;
mod tokens;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::types::Project;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(stats::get_stats))
        // User routes
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/tokens", get(users::list_user_tokens))
        .route("/users/{id}/tokens", post(users::create_user_token))
        // Token routes
        .route("/tokens", get(tokens::list_tokens))
        .route("/tokens/{id}", get(tokens::get_token))
        .route("/tokens/{id}", delete(tokens::delete_token))
        // Client application routes
        .route("/clients", get(clients::list_clients))
        .route("/clients/{user_id}/approve", post(clients::approve_client))
        .route("/clients/{user_id}/reject", post(clients::reject_client))
        // Contract routes
        .route("/contracts", post(contracts::create_contract))
        .route("/contracts", get(contracts::list_contracts))
        .route("/contracts/{id}", get(contracts::get_contract))
        .route("/contracts/{id}", patch(contracts::update_contract))
        // Project routes
        .route("/projects", post(projects::create_project))
        .route("/projects", get(projects::list_projects))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}", patch(projects::update_project))
        .route(
            "/projects/{id}/launch-summary",
            get(projects::launch_summary),
        )
        .route(
            "/projects/{id}/milestones",
            post(projects::create_milestone),
        )
        .route("/projects/{id}/messages", get(projects::list_messages))
        .route("/projects/{id}/messages", post(projects::send_message))
        .route(
            "/projects/{id}/messages/stream",
            get(projects::stream_messages),
        )
        // Milestone routes
        .route("/milestones/{id}", patch(milestones::update_milestone))
        .route("/milestones/{id}", delete(milestones::delete_milestone))
        // Invoice routes
        .route("/invoices", post(invoices::create_invoice))
        .route("/invoices", get(invoices::list_invoices))
        .route(
            "/invoices/{id}/status",
            patch(invoices::update_invoice_status),
        )
        // Deliverable routes
        .route("/deliverables", post(deliverables::create_deliverable))
        .route("/deliverables", get(deliverables::list_deliverables))
        .route(
            "/deliverables/upload",
            post(deliverables::upload_deliverable),
        )
        .route(
            "/deliverables/{id}",
            patch(deliverables::update_deliverable),
        )
        .route(
            "/deliverables/{id}",
            delete(deliverables::delete_deliverable),
        )
}

fn load_project(state: &AppState, id: &str) -> Result<Project, ApiError> {
    state
        .store
        .get_project(id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")
}
