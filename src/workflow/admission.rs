use serde::Serialize;

use crate::error::Result;
use crate::store::Store;
use crate::types::{ApprovalStatus, Role, User};

/// What a client is allowed to see, derived from their onboarding and contract state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClientView {
    /// Intake form: no onboarding row yet, or pending and not submitted.
    NoAccount,
    /// Submitted and waiting for the studio's decision.
    PendingReview,
    Rejected,
    /// Approved but no signed contract. `contract_sent` is false when nothing has been sent yet.
    AwaitingContract { contract_sent: bool },
    Active,
}

impl ClientView {
    #[must_use]
    pub fn is_active(self) -> bool {
        self == ClientView::Active
    }
}

/// Maps the current field values to a view. Nothing here is persisted.
#[must_use]
pub fn admission(
    approval_status: Option<ApprovalStatus>,
    submitted: bool,
    has_signed_contract: bool,
    has_contract: bool,
) -> ClientView {
    match approval_status {
        None => ClientView::NoAccount,
        Some(ApprovalStatus::Pending) if submitted => ClientView::PendingReview,
        Some(ApprovalStatus::Pending) => ClientView::NoAccount,
        Some(ApprovalStatus::Rejected) => ClientView::Rejected,
        Some(ApprovalStatus::Approved) if has_signed_contract => ClientView::Active,
        Some(ApprovalStatus::Approved) => ClientView::AwaitingContract {
            contract_sent: has_contract,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortalView {
    Admin,
    Client(ClientView),
}

/// Per-request snapshot of who the caller is and where they stand.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    pub submitted: bool,
    pub signed_contract: bool,
    pub has_contract: bool,
}

impl Session {
    /// Reads the session state fresh from the store.
    pub fn load(store: &dyn Store, user: &User) -> Result<Self> {
        if user.is_admin() {
            return Ok(Self {
                user_id: user.id().to_string(),
                role: Role::Admin,
                approval_status: None,
                submitted: false,
                signed_contract: false,
                has_contract: false,
            });
        }

        let onboarding = store.get_onboarding(user.id())?;
        let signed_contract = store.has_signed_contract(user.id())?;
        let has_contract =
            signed_contract || !store.list_client_contracts(user.id())?.is_empty();

        Ok(Self {
            user_id: user.id().to_string(),
            role: user.role,
            approval_status: onboarding.as_ref().map(|o| o.approval_status),
            submitted: onboarding.as_ref().is_some_and(|o| o.is_submitted()),
            signed_contract,
            has_contract,
        })
    }

    #[must_use]
    pub fn client_view(&self) -> ClientView {
        admission(
            self.approval_status,
            self.submitted,
            self.signed_contract,
            self.has_contract,
        )
    }

    #[must_use]
    pub fn view(&self) -> PortalView {
        match self.role {
            Role::Admin => PortalView::Admin,
            Role::Client => PortalView::Client(self.client_view()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_table() {
        use ApprovalStatus::*;

        assert_eq!(admission(None, false, false, false), ClientView::NoAccount);
        assert_eq!(admission(Some(Pending), false, false, false), ClientView::NoAccount);
        assert_eq!(admission(Some(Pending), true, false, false), ClientView::PendingReview);
        assert_eq!(admission(Some(Rejected), true, false, false), ClientView::Rejected);
        assert_eq!(
            admission(Some(Approved), true, false, false),
            ClientView::AwaitingContract { contract_sent: false }
        );
        assert_eq!(
            admission(Some(Approved), true, false, true),
            ClientView::AwaitingContract { contract_sent: true }
        );
        assert_eq!(admission(Some(Approved), true, true, true), ClientView::Active);
    }

    #[test]
    fn test_active_iff_approved_and_signed() {
        for status in [
            None,
            Some(ApprovalStatus::Pending),
            Some(ApprovalStatus::Approved),
            Some(ApprovalStatus::Rejected),
        ] {
            for submitted in [false, true] {
                for signed in [false, true] {
                    let view = admission(status, submitted, signed, signed);
                    assert_eq!(
                        view.is_active(),
                        status == Some(ApprovalStatus::Approved) && signed,
                        "{status:?} submitted={submitted} signed={signed}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_signed_but_reset_to_pending_is_not_active() {
        let view = admission(Some(ApprovalStatus::Pending), true, true, true);
        assert_eq!(view, ClientView::PendingReview);
    }

    #[test]
    fn test_view_serialization() {
        let json = serde_json::to_value(PortalView::Client(ClientView::AwaitingContract {
            contract_sent: true,
        }))
        .unwrap();
        assert_eq!(json["kind"], "client");
        assert_eq!(json["state"], "awaiting_contract");
        assert_eq!(json["contract_sent"], true);
    }
}
