use serde::Serialize;

use crate::types::{ProjectStatus, SupportPlan};

/// Notification owed to the client after a project update commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    Completed,
    Updated(ProjectStatus),
}

/// At most one effect per update call. Delivered always reports completion,
/// any other status only when it differs from what was stored before.
#[must_use]
pub fn status_effect(previous: ProjectStatus, next: Option<ProjectStatus>) -> Option<StatusEffect> {
    let next = next?;
    if next.is_terminal() {
        Some(StatusEffect::Completed)
    } else if next != previous {
        Some(StatusEffect::Updated(next))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SupportPlanDetails {
    pub plan: SupportPlan,
    pub name: &'static str,
    pub description: &'static str,
}

#[must_use]
pub fn support_plan_details(plan: SupportPlan) -> SupportPlanDetails {
    let (name, description) = match plan {
        SupportPlan::Nothing => ("No Support Plan", "No ongoing support included."),
        SupportPlan::Basic => ("Basic Support", "Bug fixes and minor updates for 30 days."),
        SupportPlan::Priority => (
            "Priority Support",
            "Priority bug fixes, updates, and feature requests for 90 days.",
        ),
    };
    SupportPlanDetails {
        plan,
        name,
        description,
    }
}
