mod commands;
mod info;
mod init;
pub mod pickers;
mod token;
mod user;

pub use commands::{AdminCommands, TokenCommands, UserCommands};
pub use info::run_info;
pub use init::run_init;
pub use token::run_token_create;
pub use user::run_user_add;

use crate::config::ServerConfig;
use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let db_path = ServerConfig::load(data_dir)?.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'keyline admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
