use chrono::{Duration, Utc};

use crate::auth::issue_token;

use super::init_store;
use super::pickers::{get_or_pick_user, pick_expiration};

pub fn run_token_create(
    data_dir: String,
    user_id: Option<String>,
    expires_days: Option<i64>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let Some(user) = get_or_pick_user(&store, user_id, non_interactive)? else {
        return Ok(());
    };

    let expires_in = if let Some(days) = expires_days {
        (days > 0).then(|| Duration::days(days))
    } else if non_interactive {
        None
    } else {
        match pick_expiration()? {
            Some(exp) => exp,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        }
    };

    let (raw_token, _) = issue_token(&store, user.id(), expires_in.map(|d| Utc::now() + d))?;

    println!();
    println!(
        "Token created for '{}': {}",
        user.profile.display_name(),
        raw_token
    );
    println!("  Save this now - it cannot be retrieved later.");
    println!();

    Ok(())
}
