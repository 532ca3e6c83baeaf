//! Rocket Cart CLI - Drive the shopping cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rocket-cart show
//!
//! # Add, update and remove products
//! rocket-cart add 3
//! rocket-cart update 3 2
//! rocket-cart remove 3
//!
//! # Point at another API and storage directory
//! rocket-cart --api-url https://api.example.com --storage-dir /tmp/cart show
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's amount

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocket_shoes_cart::CartConfig;
use rocket_shoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rocket-cart")]
#[command(author, version, about = "Rocket Shoes cart CLI")]
struct Cli {
    /// Base URL of the stock/catalog API (overrides `CART_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<url::Url>,

    /// Directory holding the persisted cart (overrides `CART_STORAGE_DIR`)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set a product's amount (amounts below one are ignored)
    Update {
        /// Product ID
        id: ProductId,

        /// New amount
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };
    if let Some(api_url) = cli.api_url.clone() {
        config.api.base_url = api_url;
    }
    if let Some(storage_dir) = cli.storage_dir.clone() {
        config.storage_dir = storage_dir;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_shoes_cart=info,rocket_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &CartConfig) -> Result<(), commands::cart::CommandError> {
    let store = commands::cart::open(config).await?;

    match command {
        Commands::Show => commands::cart::show(&store),
        Commands::Add { id } => commands::cart::add(&store, id).await?,
        Commands::Remove { id } => commands::cart::remove(&store, id).await?,
        Commands::Update { id, amount } => commands::cart::update(&store, id, amount).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["rocket-cart", "update", "4", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { amount: -1, .. })
        ));
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "rocket-cart",
            "add",
            "2",
            "--storage-dir",
            "/tmp/cart",
        ]);
        assert!(matches!(
            cli,
            Ok(Cli { storage_dir: Some(_), command: Commands::Add { .. }, .. })
        ));
    }
}
