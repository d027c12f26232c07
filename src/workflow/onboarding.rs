use chrono::Utc;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ClientOnboarding, IntakeSubmission, Profile, Role, User};

/// Creates a user with its role. Clients also get their pending onboarding row.
pub fn register_user(
    store: &dyn Store,
    email: &str,
    role: Role,
    full_name: Option<String>,
    company_name: Option<String>,
) -> Result<User> {
    let now = Utc::now();
    let user = User {
        profile: Profile {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_ascii_lowercase(),
            full_name: full_name.filter(|n| !n.trim().is_empty()),
            company_name: company_name.filter(|n| !n.trim().is_empty()),
            logo_url: None,
            created_at: now,
            updated_at: now,
        },
        role,
    };

    store.create_user(&user)?;
    if role == Role::Client {
        store.create_onboarding(&ClientOnboarding::new_pending(user.id(), now))?;
    }

    tracing::info!(user_id = %user.id(), role = %role, "Registered user");
    Ok(user)
}

pub fn validate_intake(intake: &IntakeSubmission) -> Result<()> {
    if intake.company_name.trim().is_empty() {
        return Err(Error::BadRequest("Company name is required".to_string()));
    }
    if intake.project_description.trim().is_empty() {
        return Err(Error::BadRequest(
            "Project description is required".to_string(),
        ));
    }
    Ok(())
}
