//! Lifecycle rules shared by the HTTP handlers and the CLI. Everything here is
//! a pure function of its inputs except `Session::load` and `register_user`.

mod admission;
mod approval;
mod contract;
mod deliverable;
mod invoice;
mod onboarding;
mod project;

pub use admission::{ClientView, PortalView, Session, admission};
pub use approval::{APPROVAL_CATALOG, ApprovalStatusEntry, ApprovalStep, approval_checklist};
pub use contract::{validate_signature, validate_terms};
pub use deliverable::{DEFAULT_FILE_TYPE, DeliverableDraft, next_version, validate_draft};
pub use invoice::paid_at_for;
pub use onboarding::{register_user, validate_intake};
pub use project::{StatusEffect, SupportPlanDetails, status_effect, support_plan_details};
