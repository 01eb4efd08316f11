//! Tiffin CLI - drive the ordering client from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Who does the API think we are?
//! tiffin auth check
//!
//! # Log in and show the resulting profile
//! tiffin auth login -e user@example.com -p <password>
//!
//! # Cart management (the cart persists across invocations)
//! tiffin cart add --id m_1 --name "Dal Makhani" --price-cents 1250 --restaurant r_1
//! tiffin cart show
//! tiffin cart checkout
//!
//! # Restaurant menu management (requires an admin session)
//! tiffin menu create --name "Dal Makhani" --price-cents 1250
//! ```
//!
//! Configuration comes from the environment (see `tiffin_client::config`);
//! a `.env` file is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tiffin_client::state::App;

mod commands;

#[derive(Parser)]
#[command(name = "tiffin")]
#[command(author, version, about = "Tiffin ordering client CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session and account operations
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Cart operations (persisted across invocations)
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Restaurant menu management
    Menu {
        #[command(subcommand)]
        action: commands::menu::MenuAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; CLI output goes through tracing like everything else
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tiffin=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::from_env()?;

    // Resolve the session before acting; every command re-evaluates access
    // against the determined session.
    app.session_mut().bootstrap().await;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&mut app, action).await?,
        Commands::Cart { action } => commands::cart::run(&mut app, action).await?,
        Commands::Menu { action } => commands::menu::run(&mut app, action).await?,
    }
    Ok(())
}
