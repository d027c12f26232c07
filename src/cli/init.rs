use std::fs;
use std::path::PathBuf;
#[cfg(unix)]
use std::path::Path;

use anyhow::bail;

use crate::auth::issue_token;
use crate::config::ServerConfig;
use crate::server::validation::validate_email;
use crate::store::{SqliteStore, Store};
use crate::types::Role;
use crate::workflow::register_user;

use super::user::prompt_email;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

/// Creates the database, the studio admin and its token. Refuses to run twice.
pub fn run_init(
    data_dir: String,
    admin_email: Option<String>,
    full_name: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let config = ServerConfig::load(&data_path)?;
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.admin_token_path();

    if store.has_admin_token()? {
        bail!(
            "Portal already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let email = match admin_email {
        Some(email) => {
            validate_email(&email).map_err(anyhow::Error::msg)?;
            email
        }
        None if non_interactive => {
            bail!("--admin-email is required in non-interactive mode");
        }
        None => prompt_email("Admin email:")?,
    };

    let admin = match store.get_user_by_email(&email.trim().to_ascii_lowercase())? {
        Some(user) if user.role == Role::Admin => user,
        Some(_) => bail!("User '{}' exists and is not an admin", email),
        None => register_user(&store, &email, Role::Admin, full_name, None)?,
    };

    let (raw_token, _) = issue_token(&store, admin.id(), None)?;
    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Admin token for {} (save this, it won't be shown again):", admin.profile.email);
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    Ok(())
}
