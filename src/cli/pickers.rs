use std::fmt;

use chrono::Duration;
use inquire::{InquireError, Select};

use crate::store::Store;
use crate::types::{Role, User};

/// User with display name and role for selection lists
pub struct UserDisplay {
    pub user: User,
}

impl fmt::Display for UserDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> [{}] ({}...)",
            self.user.profile.display_name(),
            self.user.profile.email,
            self.user.role,
            &self.user.id()[..8.min(self.user.id().len())]
        )
    }
}

/// Token expiration option for display
#[derive(Clone)]
pub struct ExpirationOption {
    pub label: &'static str,
    pub days: Option<i64>,
}

impl fmt::Display for ExpirationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Pick a user from the list
pub fn pick_user(store: &impl Store) -> anyhow::Result<Option<User>> {
    let users: Vec<UserDisplay> = store
        .list_users("", 1000)?
        .into_iter()
        .map(|user| UserDisplay { user })
        .collect();

    if users.is_empty() {
        println!("No users found.");
        return Ok(None);
    }

    let selection = Select::new("Select user:", users)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(display) => Ok(Some(display.user)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick a role for a new user
pub fn pick_role() -> anyhow::Result<Option<Role>> {
    let selection = Select::new("Role:", Role::ALL.to_vec())
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(role) => Ok(Some(role)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns None if cancelled, Some(None) for no expiration.
pub fn pick_expiration() -> anyhow::Result<Option<Option<Duration>>> {
    let options = vec![
        ExpirationOption {
            label: "30 days",
            days: Some(30),
        },
        ExpirationOption {
            label: "90 days",
            days: Some(90),
        },
        ExpirationOption {
            label: "1 year",
            days: Some(365),
        },
        ExpirationOption {
            label: "Never",
            days: None,
        },
    ];

    let selection = Select::new("Token expiration:", options)
        .with_page_size(4)
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(opt) => Ok(Some(opt.days.map(Duration::days))),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get user by ID or prompt for selection
pub fn get_or_pick_user(
    store: &impl Store,
    user_id: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<Option<User>> {
    if let Some(id) = user_id {
        let user = store
            .get_user(&id)?
            .ok_or_else(|| anyhow::anyhow!("User '{}' not found", id))?;
        Ok(Some(user))
    } else if non_interactive {
        anyhow::bail!("--user-id is required in non-interactive mode");
    } else {
        pick_user(store)
    }
}
