use inquire::{Confirm, Text};

use crate::auth::issue_token;
use crate::error::Error;
use crate::server::validation::validate_email;
use crate::types::Role;
use crate::workflow::register_user;

use super::init_store;
use super::pickers::{pick_expiration, pick_role};

pub fn run_user_add(
    data_dir: String,
    email: Option<String>,
    role: Option<String>,
    full_name: Option<String>,
    company_name: Option<String>,
    create_token_flag: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let email = if let Some(email) = email {
        validate_email(&email).map_err(anyhow::Error::msg)?;
        email
    } else if non_interactive {
        anyhow::bail!("--email is required in non-interactive mode");
    } else {
        prompt_email("Email:")?
    };

    let role = if let Some(role) = role {
        role.trim().parse::<Role>()?
    } else if non_interactive {
        anyhow::bail!("--role is required in non-interactive mode");
    } else {
        match pick_role()? {
            Some(role) => role,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        }
    };

    let user = match register_user(&store, &email, role, full_name, company_name) {
        Ok(user) => user,
        Err(Error::AlreadyExists) => anyhow::bail!("A user with email '{}' already exists", email),
        Err(e) => return Err(e.into()),
    };

    println!();
    println!(
        "Created {} \"{}\" ({})",
        user.role,
        user.profile.email,
        user.id()
    );

    let should_create_token = if create_token_flag {
        true
    } else if non_interactive {
        false
    } else {
        Confirm::new("Create access token?")
            .with_default(true)
            .prompt()?
    };

    if should_create_token {
        let expires_in = if non_interactive {
            None
        } else {
            match pick_expiration()? {
                Some(exp) => exp,
                None => {
                    println!("Token creation cancelled.");
                    return Ok(());
                }
            }
        };

        let expires_at = expires_in.map(|d| chrono::Utc::now() + d);
        let (raw_token, _) = issue_token(&store, user.id(), expires_at)?;

        println!();
        println!("Token created: {raw_token}");
        println!("  Save this now - it cannot be retrieved later.");
    }

    println!();

    Ok(())
}

/// Prompts until the input is a usable email address.
pub(super) fn prompt_email(message: &str) -> anyhow::Result<String> {
    let email = Text::new(message)
        .with_validator(|input: &str| {
            Ok(validate_email(input)
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;
    Ok(email)
}
