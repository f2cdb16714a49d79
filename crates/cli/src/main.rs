//! Campus CLI - Database migrations and profile management.
//!
//! # Usage
//!
//! ```bash
//! # Run portal and session-store migrations
//! campus-cli migrate
//!
//! # Inspect a profile
//! campus-cli profile show 6f1c2d3e-0000-4000-8000-000000000001
//!
//! # Promote a user
//! campus-cli profile set-role 6f1c2d3e-0000-4000-8000-000000000001 teacher
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(author, version, about = "Campus portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (profiles and sessions)
    Migrate,
    /// Inspect and manage user profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show a profile and whether it still needs onboarding
    Show {
        /// Principal ID issued by the identity service
        principal_id: String,
    },
    /// Change a user's role
    SetRole {
        /// Principal ID issued by the identity service
        principal_id: String,

        /// New role (`admin`, `teacher`, `student`)
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Profile { action } => match action {
            ProfileAction::Show { principal_id } => commands::profile::show(&principal_id).await,
            ProfileAction::SetRole { principal_id, role } => {
                commands::profile::set_role(&principal_id, &role).await
            }
        },
    }
}
