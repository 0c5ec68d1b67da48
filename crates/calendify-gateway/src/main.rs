use std::net::SocketAddr;
use std::sync::Arc;

use calendify_core::config::CalendifyConfig;
use calendify_roster::RosterManager;
use calendify_users::UserResolver;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::{info, warn};

mod app;
mod auth;
mod http;
mod ws;

#[derive(Parser)]
#[command(name = "calendify")]
#[command(version)]
#[command(about = "Weekly shift schedules for stores and their employees")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: $CALENDIFY_CONFIG, then ~/.calendify/calendify.toml)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway (default)
    Serve,
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Create a user and print its id
    Add {
        /// Name shown in the UI
        display_name: String,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Issue an API token for a user; it is printed once and never stored
    Issue {
        user_id: String,
        /// Free-form note, e.g. the device the token is for
        #[arg(long)]
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendify_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    // explicit path > CALENDIFY_CONFIG env > ~/.calendify/calendify.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CALENDIFY_CONFIG").ok());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = load_config(config_path.as_deref())?;
            serve(config).await
        }
        Commands::User {
            command: UserCommand::Add { display_name },
        } => {
            let config = load_config(config_path.as_deref())?;
            let users = UserResolver::new(open_db(&config.database.path)?)?;
            let user = users.create_user(&display_name)?;
            println!("{}", user.id);
            Ok(())
        }
        Commands::Token {
            command: TokenCommand::Issue { user_id, label },
        } => {
            let config = load_config(config_path.as_deref())?;
            let users = UserResolver::new(open_db(&config.database.path)?)?;
            let issued = users.issue_token(&user_id, label.as_deref())?;
            println!("{}", issued.token);
            eprintln!("token id {}; store it now, it cannot be shown again", issued.record.id);
            Ok(())
        }
    }
}

/// Every command refuses to run on a config it cannot parse.
fn load_config(path: Option<&str>) -> anyhow::Result<CalendifyConfig> {
    CalendifyConfig::load(path)
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.unwrap_or("default config")))
}

async fn serve(config: CalendifyConfig) -> anyhow::Result<()> {
    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // single SQLite file for all subsystems
    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    // each subsystem gets its own connection; both run their migrations
    let users = UserResolver::new(open_db(&db_path)?)?;
    let roster = RosterManager::new(open_db(&db_path)?)?;
    info!("database migrations complete");
    info!(mode = ?config.gateway.auth.mode, "auth configured");

    let state = Arc::new(app::AppState::new(config, users, roster));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Calendify gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

/// Open a connection with WAL and foreign keys on.
fn open_db(path: &str) -> anyhow::Result<Connection> {
    ensure_parent_dir(path);
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
