//! Chirp CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! chirp-cli migrate
//!
//! # Seed the shop catalog, plans and demo course content
//! chirp-cli seed
//!
//! # Create a user and print a fresh API token
//! chirp-cli user create -e learner@example.com -n "Learner Name" -r admin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed catalog and demo content
//! - `user create` - Create users and mint API tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chirp-cli")]
#[command(author, version, about = "Chirp CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the shop catalog, subscription plans and demo course content
    Seed,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user and print a fresh API token
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`user`, `admin`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, name, role } => {
                commands::user::create(&email, &name, &role).await?;
            }
        },
    }
    Ok(())
}
