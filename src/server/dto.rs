use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::notify::NotificationData;
use crate::types::*;
use crate::workflow::{ApprovalStatusEntry, ClientView, PortalView, SupportPlanDetails};

// Users and tokens

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserTokenRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            id: token.id,
            user_id: token.user_id,
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    #[serde(flatten)]
    pub metadata: TokenResponse,
}

// Session and onboarding

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub role: Role,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub view: PortalView,
}

#[derive(Debug, Deserialize)]
pub struct ClientListParams {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientApplicationResponse {
    #[serde(flatten)]
    pub onboarding: ClientOnboarding,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

// Contracts

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub client_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContractRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignContractRequest {
    pub signature_data: String,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    #[serde(flatten)]
    pub contract: Contract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignContractResponse {
    pub contract: Contract,
    pub view: ClientView,
}

// Projects

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Every field is optional; only the ones present are changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub health_status: Option<HealthStatus>,
    #[serde(default)]
    pub waiting_on: Option<WaitingOn>,
    #[serde(default)]
    pub support_plan: Option<SupportPlan>,
    #[serde(default)]
    pub internal_notes: Option<String>,
    /// `null` or `""` clears the date. Accepts RFC 3339 or `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "nullable")]
    pub launch_date: Option<Option<String>>,
    #[serde(default)]
    pub launch_notes: Option<String>,
}

/// Keeps an explicit `null` (`Some(None)`) apart from a missing field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct AdminProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LaunchSummaryResponse {
    pub project: Project,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
    pub support_plan: SupportPlanDetails,
    pub deliverables: Vec<Deliverable>,
    pub approvals: Vec<ApprovalStatusEntry>,
}

// Milestones

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMilestoneRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

// Invoices

/// Amount in major units, as typed ("19.99") or as a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(f64),
}

impl AmountInput {
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            AmountInput::Text(s) => s.clone(),
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub project_id: String,
    #[serde(default)]
    pub amount: Option<AmountInput>,
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub formatted_amount: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            formatted_amount: invoice.formatted_amount(),
            invoice,
        }
    }
}

// Deliverables

#[derive(Debug, Deserialize)]
pub struct CreateDeliverableRequest {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeliverableRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub is_delivered: Option<bool>,
}

// Messages

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: usize,
}

// Approvals

#[derive(Debug, Deserialize)]
pub struct CreateApprovalRequest {
    pub approval_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// Functions

#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    #[serde(rename = "emailResponse")]
    pub email_response: Value,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
    #[serde(rename = "publicUrl")]
    pub public_url: String,
}
