//! Kavka CLI - database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! kavka-cli migrate
//!
//! # Create an admin user
//! kavka-cli user create -e jana@kavkabistro.cz -n "Jana" -p "a strong password"
//!
//! # Hash a password for manual inserts
//! kavka-cli user hash-password -p "a strong password"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kavka-cli")]
#[command(author, version, about = "Kavka Bistro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new admin user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (hashed with Argon2id before storage)
        #[arg(short, long)]
        password: String,
    },
    /// Print the Argon2id hash of a password
    HashPassword {
        /// Password to hash
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::user::create(&email, &name, &password).await?;
            }
            UserAction::HashPassword { password } => {
                commands::user::hash_password(&password)?;
            }
        },
    }
    Ok(())
}
