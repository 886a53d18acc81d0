//! ShopSpot CLI - Database migrations and merchant account tools.
//!
//! # Usage
//!
//! ```bash
//! # Run dashboard database migrations
//! shopspot-cli migrate
//!
//! # Create a merchant account
//! shopspot-cli merchant create -e owner@example.com -n "Luigi" --password '...'
//!
//! # Link a merchant to an existing store
//! shopspot-cli merchant link -m <merchant-id> -s <store-uuid> -r staff
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `merchant create` - Create merchant accounts
//! - `merchant link` - Link a merchant to a store with a role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopspot-cli")]
#[command(author, version, about = "ShopSpot dashboard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dashboard database migrations
    Migrate,
    /// Manage merchant accounts
    Merchant {
        #[command(subcommand)]
        action: MerchantAction,
    },
}

#[derive(Subcommand)]
enum MerchantAction {
    /// Create a new merchant account
    Create {
        /// Merchant email address
        #[arg(short, long)]
        email: String,

        /// Merchant display name
        #[arg(short, long)]
        name: Option<String>,

        /// Account password (at least 8 characters)
        #[arg(long, env = "SHOPSPOT_MERCHANT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Account id; a random one is generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    /// Link a merchant to a store
    Link {
        /// Merchant account id
        #[arg(short, long)]
        merchant: String,

        /// Store id (UUID)
        #[arg(short, long)]
        store: String,

        /// Store role (`admin`, `staff`, `viewer`)
        #[arg(short, long, default_value = "staff")]
        role: String,
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
        Commands::Migrate => commands::migrate::dashboard().await?,
        Commands::Merchant { action } => match action {
            MerchantAction::Create {
                email,
                name,
                password,
                id,
            } => {
                commands::merchant::create(&email, name.as_deref(), &password, id.as_deref())
                    .await?;
            }
            MerchantAction::Link {
                merchant,
                store,
                role,
            } => commands::merchant::link(&merchant, &store, &role).await?,
        },
    }
    Ok(())
}
