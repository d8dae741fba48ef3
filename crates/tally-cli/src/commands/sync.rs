use std::path::Path;

use tally_core::sync::SyncEngine;

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_sync(db_path: &Path, config: &CliConfig) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;
    let Some(api) = &session.remote else {
        return Err(CliError::SyncNotConfigured);
    };

    let engine = SyncEngine::new(&session.db, api);
    let report = engine.sync_products().await?;

    if report.attempted == 0 {
        println!("Nothing to sync");
    } else {
        println!(
            "Synced {} of {} pending row(s){}",
            report.synced,
            report.attempted,
            if report.failed > 0 {
                format!(", {} failed (will retry)", report.failed)
            } else {
                String::new()
            }
        );
    }
    Ok(())
}
