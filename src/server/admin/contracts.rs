use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::Map;
use uuid::Uuid;

use super::load_project;
use super::projects::{load_client, non_blank};
use crate::auth::RequireAdmin;
use crate::notify::NotificationKind;
use crate::server::AppState;
use crate::server::dto::{ContractResponse, CreateContractRequest, UpdateContractRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Contract, Project};
use crate::workflow::validate_terms;

/// Sends a contract to a client. Without a project id a project is created
/// first; it is kept even if the contract insert then fails.
pub async fn create_contract(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateContractRequest>,
) -> impl IntoResponse {
    validate_terms(&req.title, &req.content)?;
    let client = load_client(&state, &req.client_id)?;
    let now = Utc::now();

    let project = match non_blank(req.project_id) {
        Some(project_id) => {
            let project = load_project(&state, &project_id)?;
            if project.client_id != client.id() {
                return Err(ApiError::bad_request(
                    "Project does not belong to this client",
                ));
            }
            project
        }
        None => {
            let name = non_blank(req.project_name).unwrap_or_else(|| req.title.trim().to_string());
            let project = Project::new(client.id(), &name, None, now);
            state
                .store
                .create_project(&project)
                .api_err("Failed to create project")?;
            tracing::info!(
                project_id = %project.id,
                client_id = %client.id(),
                "Created project for contract"
            );
            project
        }
    };

    let contract = Contract {
        id: Uuid::new_v4().to_string(),
        client_id: client.id().to_string(),
        project_id: project.id.clone(),
        title: req.title.trim().to_string(),
        content: req.content,
        is_signed: false,
        signature_data: None,
        signed_at: None,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_contract(&contract)
        .api_err("Failed to create contract")?;

    tracing::info!(contract_id = %contract.id, client_id = %contract.client_id, "Sent contract");
    state.notify(NotificationKind::ContractSent, client.id(), Map::new());

    let response = ContractResponse {
        contract,
        project_name: Some(project.name),
        client_email: Some(client.profile.email),
        client_name: client.profile.full_name,
    };

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_contracts(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let contracts = state
        .store
        .list_contracts()
        .api_err("Failed to list contracts")?;

    let mut responses = Vec::with_capacity(contracts.len());
    for contract in contracts {
        responses.push(with_details(&state, contract)?);
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_contract(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let contract = load_contract(&state, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(with_details(&state, contract)?)))
}

/// Rewrites the terms of an unsigned contract. Signed contracts are frozen.
pub async fn update_contract(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContractRequest>,
) -> impl IntoResponse {
    let contract = load_contract(&state, &id)?;

    let title = req.title.unwrap_or(contract.title);
    let content = req.content.unwrap_or(contract.content);
    validate_terms(&title, &content)?;

    let updated = state
        .store
        .update_contract_terms(&id, title.trim(), &content)
        .api_err("Failed to update contract")?;
    if !updated {
        return Err(ApiError::conflict("Signed contracts cannot be edited"));
    }

    let contract = load_contract(&state, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(with_details(&state, contract)?)))
}

fn load_contract(state: &AppState, id: &str) -> Result<Contract, ApiError> {
    state
        .store
        .get_contract(id)
        .api_err("Failed to get contract")?
        .or_not_found("Contract not found")
}

fn with_details(state: &AppState, contract: Contract) -> Result<ContractResponse, ApiError> {
    let profile = state
        .store
        .get_profile(&contract.client_id)
        .api_err("Failed to get client profile")?;
    let project = state
        .store
        .get_project(&contract.project_id)
        .api_err("Failed to get project")?;

    Ok(ContractResponse {
        project_name: project.map(|p| p.name),
        client_email: profile.as_ref().map(|p| p.email.clone()),
        client_name: profile.and_then(|p| p.full_name),
        contract,
    })
}
