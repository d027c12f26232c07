use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::load_project;
use super::projects::non_blank;
use crate::auth::RequireAdmin;
use crate::notify::NotificationKind;
use crate::server::AppState;
use crate::server::dto::{CreateInvoiceRequest, InvoiceResponse, UpdateInvoiceStatusRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require;
use crate::types::money::{DEFAULT_CURRENCY, parse_major_units};
use crate::types::{Invoice, InvoiceStatus};
use crate::workflow::paid_at_for;

pub async fn create_invoice(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let project_id = require(&req.project_id, "Project")?;
    let description = require(&req.description, "Description")?.to_string();
    let amount_text = req.amount.as_ref().map(|a| a.as_text()).unwrap_or_default();
    let amount = parse_major_units(&amount_text)?;

    let project = load_project(&state, project_id)?;

    let currency = non_blank(req.currency)
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let now = Utc::now();
    let invoice = Invoice {
        id: Uuid::new_v4().to_string(),
        project_id: project.id,
        client_id: project.client_id,
        amount,
        currency,
        description,
        due_date: non_blank(req.due_date),
        status: InvoiceStatus::Pending,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_invoice(&invoice)
        .api_err("Failed to create invoice")?;

    tracing::info!(invoice_id = %invoice.id, amount = invoice.amount, "Created invoice");

    let mut data = Map::new();
    data.insert(
        "amount".to_string(),
        Value::String(invoice.formatted_amount()),
    );
    data.insert(
        "description".to_string(),
        Value::String(invoice.description.clone()),
    );
    state.notify(NotificationKind::InvoiceCreated, &invoice.client_id, data);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(InvoiceResponse::from(invoice))),
    ))
}

pub async fn list_invoices(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let invoices = state
        .store
        .list_invoices()
        .api_err("Failed to list invoices")?;

    let responses: Vec<InvoiceResponse> = invoices.into_iter().map(InvoiceResponse::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

/// Any status may follow any other. `paid_at` tracks the paid state.
pub async fn update_invoice_status(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInvoiceStatusRequest>,
) -> impl IntoResponse {
    let status: InvoiceStatus = req.status.trim().parse()?;

    let updated = state
        .store
        .set_invoice_status(&id, status, paid_at_for(status, Utc::now()))
        .api_err("Failed to update invoice")?;
    if !updated {
        return Err(ApiError::not_found("Invoice not found"));
    }

    let invoice = state
        .store
        .get_invoice(&id)
        .api_err("Failed to get invoice")?
        .or_not_found("Invoice not found")?;

    tracing::info!(invoice_id = %invoice.id, status = %status, "Updated invoice status");

    Ok::<_, ApiError>(Json(ApiResponse::success(InvoiceResponse::from(invoice))))
}
