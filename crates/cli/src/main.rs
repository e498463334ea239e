//! Awesome Store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run schema and session store migrations
//! store-cli migrate
//!
//! # Create a user with extra roles
//! store-cli user create -e ops@example.com -n "Ops" -p 'long-password' -r admin
//!
//! # Wipe all users and insert the default admin
//! store-cli user reset
//!
//! # Insert demo products
//! store-cli seed products --count 40
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "store-cli")]
#[command(author, version, about = "Awesome Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (schema and session store)
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Extra roles on top of `customer` (`admin`, `superadmin`); repeatable
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },
    /// Delete every user and insert the default admin account
    Reset {
        /// Password for the default admin; generated when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert demo products across departments
    Products {
        /// How many products to insert
        #[arg(short, long, default_value_t = 24)]
        count: u32,
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                roles,
            } => {
                commands::user::create(&email, &name, &password, &roles).await?;
            }
            UserAction::Reset { password } => {
                commands::user::reset(password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { count } => commands::seed::products(count).await?,
        },
    }
    Ok(())
}
