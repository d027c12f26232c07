mod models;
pub mod money;
mod status;

pub use models::*;
pub use status::{
    ApprovalStatus, ApprovalType, HealthStatus, InvoiceStatus, ProjectStatus, Role, SupportPlan,
    WaitingOn,
};
