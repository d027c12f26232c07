use chrono::{DateTime, Utc};

use crate::types::InvoiceStatus;

/// `paid_at` is present exactly when the invoice is paid.
#[must_use]
pub fn paid_at_for(status: InvoiceStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match status {
        InvoiceStatus::Paid => Some(now),
        InvoiceStatus::Pending | InvoiceStatus::Overdue => None,
    }
}
