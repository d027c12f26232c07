use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use keyline::cli::{
    AdminCommands, TokenCommands, UserCommands, run_info, run_init, run_token_create, run_user_add,
};
use keyline::config::ServerConfig;
use keyline::notify::{Mailer, Notifier, mailer_from_config};
use keyline::realtime::MessageHub;
use keyline::server::{AppState, create_router};
use keyline::storage::FileStorage;
use keyline::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "keyline")]
#[command(about = "A self-hostable client portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to (overrides keyline.toml)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides keyline.toml)
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and stored files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Public base URL for external access (e.g., "https://portal.example.com").
        /// Used for public file URLs. If not set, URLs are derived from request headers.
        #[arg(long, env = "KEYLINE_PUBLIC_BASE_URL")]
        public_base_url: Option<String>,

        /// API key for the Resend email API. Without one, emails are only logged.
        #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
        resend_api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keyline=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                admin_email,
                full_name,
                non_interactive,
            } => run_init(data_dir, admin_email, full_name, non_interactive)?,
            AdminCommands::User { command } => match command {
                UserCommands::Add {
                    data_dir,
                    email,
                    role,
                    full_name,
                    company_name,
                    create_token,
                    non_interactive,
                } => run_user_add(
                    data_dir,
                    email,
                    role,
                    full_name,
                    company_name,
                    create_token,
                    non_interactive,
                )?,
            },
            AdminCommands::Token { command } => match command {
                TokenCommands::Create {
                    data_dir,
                    user_id,
                    expires_days,
                    non_interactive,
                } => run_token_create(data_dir, user_id, expires_days, non_interactive)?,
            },
            AdminCommands::Info { data_dir, json } => run_info(data_dir, json)?,
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            public_base_url,
            resend_api_key,
        } => {
            let mut config = ServerConfig::load(data_dir)?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if public_base_url.is_some() {
                config.public_base_url = public_base_url;
            }
            if resend_api_key.is_some() {
                config.notify.resend_api_key = resend_api_key;
            }

            serve(config).await?;
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.admin_token_path();
    if !token_file.exists() {
        bail!(
            "Portal not initialized. Run 'keyline admin init' first to create the database and admin token."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(
            "Portal not initialized. Run 'keyline admin init' first to create the database and admin token."
        );
    }

    info!("Admin token available at {}", token_file.display());

    let store: Arc<dyn Store> = Arc::new(store);
    let mailer: Arc<dyn Mailer> = Arc::from(mailer_from_config(&config.notify)?);

    let state = Arc::new(AppState {
        notifier: Arc::new(Notifier::new(store.clone(), mailer, &config.notify)),
        storage: FileStorage::new(&config.data_dir),
        hub: MessageHub::new(),
        store,
        config: config.clone(),
    });

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
