use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Track branch inventory from the command line, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a product with its initial stock
    #[command(alias = "new")]
    Add {
        /// Unique product code
        #[arg(long)]
        code: String,
        /// Product name
        #[arg(long)]
        name: String,
        /// Product description
        #[arg(long, default_value = "")]
        description: String,
        /// Unit price
        #[arg(long)]
        price: f64,
        /// Initial on-hand quantity
        #[arg(long, default_value = "0")]
        quantity: i64,
        /// Lot identifier
        #[arg(long)]
        batch: String,
        /// Branch holding the stock
        #[arg(long)]
        branch: i64,
    },
    /// List a branch's stock
    List {
        /// Branch to list
        #[arg(long)]
        branch: i64,
        /// Filter by product code or name
        #[arg(long)]
        search: Option<String>,
        /// Read from the local store even when online
        #[arg(long)]
        local: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a product's stock quantity
    Adjust {
        /// Branch holding the stock
        #[arg(long)]
        branch: i64,
        /// Product id (local)
        #[arg(long)]
        product: i64,
        /// New quantity; negative values floor at zero
        #[arg(long)]
        quantity: i64,
        /// Acting user id for the audit trail
        #[arg(long)]
        user: Option<i64>,
    },
    /// Delete a product and its stock
    Delete {
        /// Product id (local)
        id: i64,
    },
    /// Show the branch list
    Branches {
        /// Fetch a fresh list from the server first
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload pending local writes to the server
    Sync,
    /// Show how many local rows still await upload
    Status,
}
