//! # Seed Ledger Writer
//!
//! Writes the demonstration catalog, customers and discounts to the store.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database
//! cargo run -p wholesale-db --bin wholesale-seed
//!
//! # Specify database path
//! cargo run -p wholesale-db --bin wholesale-seed -- --db ./data/wholesale.db
//!
//! # Overwrite an existing ledger
//! cargo run -p wholesale-db --bin wholesale-seed -- --force
//! ```
//!
//! ## Seeded Data
//! - 10 catalog items (rice, oil, flour, sugar, ...)
//! - 50 customers `cust-1` .. `cust-50`, zero balance
//! - One discount per (customer, item) pair, 1% .. 10%
//! - No sales, purchases or payments

use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use wholesale_core::LedgerState;
use wholesale_db::{AppConfig, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Wholesale Ledger Seed Writer");
                println!();
                println!("Usage: wholesale-seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("  -c, --config <PATH>   Config file path (default: platform config dir)");
                println!("  -f, --force           Overwrite an existing ledger");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database_path = path;
    }

    println!("🌱 Wholesale Ledger Seed Writer");
    println!("===============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let slots = db.slots();
    if slots.has_data().await? && !force {
        println!("⚠ Database already holds a ledger");
        println!("  Skipping seed to avoid overwriting it.");
        println!("  Pass --force to replace it.");
        return Ok(());
    }

    let state = LedgerState::seeded();
    let version = slots.state_version().await?;
    let version = slots.save_state(&state, version).await?;

    println!();
    println!("✓ Wrote {} items", state.items.len());
    println!("✓ Wrote {} customers", state.customers.len());
    println!("✓ Wrote {} discounts", state.discounts.len());
    println!("  State version: {}", version);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wholesale=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
