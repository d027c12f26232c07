mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations (profile + role)
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_tokens(&self, cursor: &str, limit: i32) -> Result<Vec<Token>>;
    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;
    fn has_admin_token(&self) -> Result<bool>;

    // Onboarding operations
    fn create_onboarding(&self, onboarding: &ClientOnboarding) -> Result<()>;
    fn get_onboarding(&self, user_id: &str) -> Result<Option<ClientOnboarding>>;
    fn list_onboarding(&self, status: Option<ApprovalStatus>) -> Result<Vec<ClientOnboarding>>;
    /// Writes intake answers only while `submitted_at` is unset. Returns false otherwise.
    fn submit_onboarding(
        &self,
        user_id: &str,
        intake: &IntakeSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool>;
    /// `approved_at` of `None` leaves the stored value untouched.
    fn set_approval_status(
        &self,
        user_id: &str,
        status: ApprovalStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    // Project operations
    fn create_project(&self, project: &Project) -> Result<()>;
    fn get_project(&self, id: &str) -> Result<Option<Project>>;
    fn list_projects(&self) -> Result<Vec<Project>>;
    fn list_client_projects(&self, client_id: &str) -> Result<Vec<Project>>;
    fn update_project(&self, project: &Project) -> Result<()>;

    // Contract operations
    fn create_contract(&self, contract: &Contract) -> Result<()>;
    fn get_contract(&self, id: &str) -> Result<Option<Contract>>;
    fn list_contracts(&self) -> Result<Vec<Contract>>;
    fn list_client_contracts(&self, client_id: &str) -> Result<Vec<Contract>>;
    /// Rewrites title and content of an unsigned contract. Returns false once signed.
    fn update_contract_terms(&self, id: &str, title: &str, content: &str) -> Result<bool>;
    /// Single conditional update scoped by id, owner and unsigned state.
    fn sign_contract(
        &self,
        id: &str,
        client_id: &str,
        signature_data: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<bool>;
    fn has_signed_contract(&self, client_id: &str) -> Result<bool>;

    // Deliverable operations
    fn create_deliverable(&self, deliverable: &Deliverable) -> Result<()>;
    fn get_deliverable(&self, id: &str) -> Result<Option<Deliverable>>;
    fn list_deliverables(&self) -> Result<Vec<Deliverable>>;
    fn list_project_deliverables(
        &self,
        project_id: &str,
        delivered_only: bool,
    ) -> Result<Vec<Deliverable>>;
    fn update_deliverable(&self, deliverable: &Deliverable) -> Result<()>;
    fn delete_deliverable(&self, id: &str) -> Result<bool>;

    // Invoice operations
    fn create_invoice(&self, invoice: &Invoice) -> Result<()>;
    fn get_invoice(&self, id: &str) -> Result<Option<Invoice>>;
    fn list_invoices(&self) -> Result<Vec<Invoice>>;
    fn list_project_invoices(&self, project_id: &str) -> Result<Vec<Invoice>>;
    fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    // Message operations (append-only)
    fn create_message(&self, message: &Message) -> Result<()>;
    fn list_project_messages(&self, project_id: &str) -> Result<Vec<Message>>;
    fn mark_messages_read(&self, project_id: &str, reader_id: &str) -> Result<usize>;

    // Milestone operations
    fn create_milestone(&self, milestone: &Milestone) -> Result<()>;
    fn get_milestone(&self, id: &str) -> Result<Option<Milestone>>;
    fn list_project_milestones(&self, project_id: &str) -> Result<Vec<Milestone>>;
    fn update_milestone(&self, milestone: &Milestone) -> Result<()>;
    fn delete_milestone(&self, id: &str) -> Result<bool>;

    // Milestone approval operations (insert-only, unique per project and type)
    fn create_approval(&self, approval: &MilestoneApproval) -> Result<()>;
    fn list_project_approvals(&self, project_id: &str) -> Result<Vec<MilestoneApproval>>;

    fn dashboard_stats(&self) -> Result<DashboardStats>;
}
