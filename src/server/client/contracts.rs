use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::RequireClient;
use crate::server::AppState;
use crate::server::dto::{SignContractRequest, SignContractResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::store::Store;
use crate::types::{Contract, User};
use crate::workflow::{Session, validate_signature};

pub async fn list_contracts(
    client: RequireClient,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let contracts = state
        .store
        .list_client_contracts(client.user.id())
        .api_err("Failed to list contracts")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(contracts)))
}

pub async fn get_contract(
    client: RequireClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let contract = owned_contract(state.store.as_ref(), &client.user, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(contract)))
}

/// Signs once. The store update is conditional on the contract still being unsigned.
pub async fn sign_contract(
    client: RequireClient,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SignContractRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let contract = owned_contract(store, &client.user, &id)?;
    validate_signature(&req.signature_data)?;
    if contract.is_signed {
        return Err(ApiError::conflict("Contract already signed"));
    }

    let signed = store
        .sign_contract(&id, client.user.id(), &req.signature_data, Utc::now())
        .api_err("Failed to sign contract")?;
    if !signed {
        return Err(ApiError::conflict("Contract already signed"));
    }

    tracing::info!(contract_id = %id, client_id = %client.user.id(), "Contract signed");

    let contract = owned_contract(store, &client.user, &id)?;
    let session = Session::load(store, &client.user).api_err("Failed to load session")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SignContractResponse {
        contract,
        view: session.client_view(),
    })))
}

fn owned_contract(store: &dyn Store, user: &User, id: &str) -> Result<Contract, ApiError> {
    match store.get_contract(id).api_err("Failed to get contract")? {
        Some(contract) if contract.client_id == user.id() => Ok(contract),
        _ => Err(ApiError::not_found("Contract not found")),
    }
}
