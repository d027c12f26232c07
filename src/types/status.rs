use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Declares a closed set of snake_case values stored as TEXT columns.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| Error::InvalidValue {
                    field: $field,
                    value: s.to_string(),
                })
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                Self::parse(text).ok_or_else(|| {
                    FromSqlError::Other(format!("invalid {}: {text}", $field).into())
                })
            }
        }
    };
}

text_enum! {
    Role("role") {
        Admin => "admin",
        Client => "client",
    }
}

text_enum! {
    ApprovalStatus("approval_status") {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    /// Ordered lifecycle stages of a project. `Delivered` is terminal.
    ProjectStatus("status") {
        Discovery => "discovery",
        Design => "design",
        Development => "development",
        Review => "review",
        Delivered => "delivered",
    }
}

text_enum! {
    HealthStatus("health_status") {
        OnTrack => "on_track",
        NeedsAttention => "needs_attention",
        Blocked => "blocked",
    }
}

text_enum! {
    WaitingOn("waiting_on") {
        Nobody => "none",
        Client => "client",
        Studio => "studio",
        ThirdParty => "third_party",
    }
}

text_enum! {
    SupportPlan("support_plan") {
        Nothing => "none",
        Basic => "basic",
        Priority => "priority",
    }
}

text_enum! {
    InvoiceStatus("status") {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
    }
}

text_enum! {
    ApprovalType("approval_type") {
        DesignApproval => "design_approval",
        ScopeApproval => "scope_approval",
        DevelopmentApproval => "development_approval",
        FinalApproval => "final_approval",
    }
}

impl ProjectStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Delivered)
    }

    /// Zero-based position in the lifecycle.
    #[must_use]
    pub fn stage(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Discovery
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::OnTrack
    }
}

impl Default for WaitingOn {
    fn default() -> Self {
        WaitingOn::Nobody
    }
}

impl Default for SupportPlan {
    fn default() -> Self {
        SupportPlan::Nothing
    }
}
