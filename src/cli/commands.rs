use clap::Subcommand;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the portal (create database, admin user and admin token)
    Init {
        /// Data directory for the database and stored files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address of the studio admin
        #[arg(long)]
        admin_email: Option<String>,

        /// Display name of the studio admin
        #[arg(long)]
        full_name: Option<String>,

        /// Skip interactive prompts (requires --admin-email)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage access tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Show portal status information
    Info {
        /// Data directory for the database and stored files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new admin or client user
    Add {
        /// Data directory for the database and stored files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address for the new user
        #[arg(long)]
        email: Option<String>,

        /// Role for the new user (admin or client)
        #[arg(long)]
        role: Option<String>,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,

        /// Company name
        #[arg(long)]
        company_name: Option<String>,

        /// Create a token for the new user
        #[arg(long)]
        create_token: bool,

        /// Skip interactive prompts (requires --email and --role)
        #[arg(long)]
        non_interactive: bool,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Create a new access token
    Create {
        /// Data directory for the database and stored files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID for the token
        #[arg(long)]
        user_id: Option<String>,

        /// Token expiration in days (omit for no expiration)
        #[arg(long)]
        expires_days: Option<i64>,

        /// Skip interactive prompts (requires --user-id)
        #[arg(long)]
        non_interactive: bool,
    },
}
