//! Grips & Gears CLI - Operator tools for the storefront API.
//!
//! # Usage
//!
//! ```bash
//! # Write the PDF invoice of a paid order
//! gg-cli invoice SSLCZ_1718000000000 --email rider@example.com
//!
//! # Print quarterly revenue and order counts
//! gg-cli stats --period quarterly --email admin@example.com
//!
//! # List the tyre catalog
//! gg-cli catalog --category tyre
//! ```
//!
//! Reads the same environment as the storefront (`STOREFRONT_API_URL`,
//! `STORE_SUPPORT_EMAIL`, ...), including a `.env` file when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grips_gears_core::ProductCategory;
use grips_gears_storefront::charts::Period;

mod commands;

#[derive(Parser)]
#[command(name = "gg-cli")]
#[command(author, version, about = "Grips & Gears CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the PDF invoice of a paid order
    Invoice {
        /// Gateway transaction id of the order
        tran_id: String,

        /// Email address the order belongs to
        #[arg(short, long)]
        email: String,

        /// Output path (defaults to the invoice file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print bucketed revenue and order counts
    Stats {
        /// Bucket size (monthly, quarterly, yearly)
        #[arg(short, long, default_value = "monthly")]
        period: Period,

        /// Admin email used to obtain an API token
        #[arg(short, long, env = "GG_ADMIN_EMAIL")]
        email: String,
    },
    /// List products
    Catalog {
        /// Only this category (helmet, tyre, spareparts)
        #[arg(short, long)]
        category: Option<ProductCategory>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Invoice {
            tran_id,
            email,
            out,
        } => commands::invoice::write(&tran_id, &email, out).await?,
        Commands::Stats { period, email } => commands::stats::print(period, &email).await?,
        Commands::Catalog { category } => commands::catalog::print(category).await?,
    }
    Ok(())
}
