use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "roombook", version, about = "Room booking CLI with Google Calendar integration")]
struct Cli {
    /// Google access token from a previous `auth callback`
    #[arg(long, global = true, env = "ROOMBOOK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Google OAuth flow
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Events on the primary Google calendar
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Calendar synchronization status
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Room management
    Room {
        #[command(subcommand)]
        action: commands::room::RoomAction,
    },
    /// Booking management
    Booking {
        #[command(subcommand)]
        action: commands::booking::BookingAction,
    },
    /// Configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let token = cli.access_token.as_deref();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Events { action } => commands::events::run(action, token).await,
        Commands::Sync { action } => commands::sync::run(action).await,
        Commands::Room { action } => commands::room::run(action).await,
        Commands::Booking { action } => commands::booking::run(action).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
