use serde::Serialize;

use crate::types::{ApprovalType, MilestoneApproval};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ApprovalStep {
    pub approval_type: ApprovalType,
    pub label: &'static str,
    pub description: &'static str,
}

pub const APPROVAL_CATALOG: [ApprovalStep; 4] = [
    ApprovalStep {
        approval_type: ApprovalType::DesignApproval,
        label: "Design Approval",
        description: "Approve the design mockups and visual direction",
    },
    ApprovalStep {
        approval_type: ApprovalType::ScopeApproval,
        label: "Scope Approval",
        description: "Approve the project scope and requirements",
    },
    ApprovalStep {
        approval_type: ApprovalType::DevelopmentApproval,
        label: "Development Approval",
        description: "Approve development progress and implementation",
    },
    ApprovalStep {
        approval_type: ApprovalType::FinalApproval,
        label: "Final Approval",
        description: "Approve the final deliverables for launch",
    },
];

/// A catalog entry paired with its recorded approval, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalStatusEntry {
    #[serde(flatten)]
    pub step: ApprovalStep,
    pub approval: Option<MilestoneApproval>,
}

#[must_use]
pub fn approval_checklist(approvals: &[MilestoneApproval]) -> Vec<ApprovalStatusEntry> {
    APPROVAL_CATALOG
        .iter()
        .map(|step| ApprovalStatusEntry {
            step: *step,
            approval: approvals
                .iter()
                .find(|a| a.approval_type == step.approval_type)
                .cloned(),
        })
        .collect()
}
