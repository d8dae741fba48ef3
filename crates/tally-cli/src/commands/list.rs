use std::path::Path;

use tally_core::offline::list_stock;
use tally_core::remote::RemoteApi;

use crate::commands::common::{format_stock_lines, stock_to_item, Session, StockListItem};
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_list(
    branch_id: i64,
    search: Option<&str>,
    force_local: bool,
    as_json: bool,
    db_path: &Path,
    config: &CliConfig,
) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;

    let views = if force_local || !session.is_online().await {
        list_stock(&session.db, branch_id, search).await?
    } else if let Some(api) = &session.remote {
        match api.list_stock(branch_id, search).await {
            Ok(views) => views,
            Err(error) => {
                // Degrade to the local cache mid-read
                eprintln!("Remote listing failed ({error}); showing local stock");
                list_stock(&session.db, branch_id, search).await?
            }
        }
    } else {
        list_stock(&session.db, branch_id, search).await?
    };

    if as_json {
        let items = views.iter().map(stock_to_item).collect::<Vec<StockListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No stock recorded for branch {branch_id}.");
        return Ok(());
    }

    for line in format_stock_lines(&views) {
        println!("{line}");
    }
    Ok(())
}
