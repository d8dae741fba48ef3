use std::path::Path;

use tally_core::db::{
    LibSqlProductRepository, LibSqlStockRepository, ProductRepository, StockRepository,
};

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_status(db_path: &Path, config: &CliConfig) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;

    let products = LibSqlProductRepository::new(session.db.connection())
        .count_unsynced()
        .await?;
    let stocks = LibSqlStockRepository::new(session.db.connection())
        .count_unsynced()
        .await?;

    println!("Pending upload: {products} product(s), {stocks} stock row(s)");

    if config.has_remote() {
        let online = session.is_online().await;
        println!("Backend: {}", if online { "reachable" } else { "offline" });
    } else {
        println!("Backend: not configured");
    }
    Ok(())
}
