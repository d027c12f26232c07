use std::fmt;

use serde::{Deserialize, Serialize};

/// Event types the studio emails clients about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContractSent,
    InvoiceCreated,
    DeliverableSent,
    ClientApproved,
    MessageReceived,
    ProjectUpdated,
    ProjectCompleted,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 7] = [
        NotificationKind::ContractSent,
        NotificationKind::InvoiceCreated,
        NotificationKind::DeliverableSent,
        NotificationKind::ClientApproved,
        NotificationKind::MessageReceived,
        NotificationKind::ProjectUpdated,
        NotificationKind::ProjectCompleted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NotificationKind::ContractSent => "contract_sent",
            NotificationKind::InvoiceCreated => "invoice_created",
            NotificationKind::DeliverableSent => "deliverable_sent",
            NotificationKind::ClientApproved => "client_approved",
            NotificationKind::MessageReceived => "message_received",
            NotificationKind::ProjectUpdated => "project_updated",
            NotificationKind::ProjectCompleted => "project_completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_serde() {
        for kind in NotificationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("invoice_paid"), None);
    }
}
