//! Tally CLI - branch inventory from the terminal
//!
//! Every write lands in the local store first, so the tool works without
//! connectivity; `tally sync` (or any online write) uploads what's pending.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use tally_core::ProductDraft;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::adjust::run_adjust;
use crate::commands::branches::run_branches;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::config::{resolve_db_path, CliConfig};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tally=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    let config = CliConfig::from_env();

    match cli.command {
        Commands::Add {
            code,
            name,
            description,
            price,
            quantity,
            batch,
            branch,
        } => {
            let draft = ProductDraft {
                code,
                name,
                description,
                price,
                quantity,
                batch,
            };
            run_add(draft, branch, &db_path, &config).await?;
        }
        Commands::List {
            branch,
            search,
            local,
            json,
        } => {
            run_list(branch, search.as_deref(), local, json, &db_path, &config).await?;
        }
        Commands::Adjust {
            branch,
            product,
            quantity,
            user,
        } => {
            run_adjust(branch, product, quantity, user, &db_path, &config).await?;
        }
        Commands::Delete { id } => run_delete(id, &db_path, &config).await?,
        Commands::Branches { refresh, json } => {
            run_branches(refresh, json, &db_path, &config).await?;
        }
        Commands::Sync => run_sync(&db_path, &config).await?,
        Commands::Status => run_status(&db_path, &config).await?,
    }

    Ok(())
}
