use std::path::Path;

use tally_core::offline::{adjust_stock_quantity, StockAdjustment};
use tally_core::sync::SyncEngine;

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_adjust(
    branch_id: i64,
    product_id: i64,
    quantity: i64,
    user_id: Option<i64>,
    db_path: &Path,
    config: &CliConfig,
) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;

    let logs = adjust_stock_quantity(
        &session.db,
        &[StockAdjustment {
            product_id,
            new_quantity: quantity,
        }],
        branch_id,
        user_id,
    )
    .await?;

    for log in &logs {
        println!(
            "{}: {} -> {} ({}{})",
            log.action,
            log.old_quantity,
            log.new_quantity,
            if log.quantity_change >= 0 { "+" } else { "" },
            log.quantity_change
        );
    }

    if session.is_online().await {
        if let Some(api) = &session.remote {
            let engine = SyncEngine::new(&session.db, api);
            if let Err(error) = engine.sync_products().await {
                eprintln!("Adjusted locally; sync pending ({error})");
            }
        }
    }

    Ok(())
}
