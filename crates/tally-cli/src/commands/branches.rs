use std::path::Path;

use tally_core::db::LibSqlBranchRepository;
use tally_core::sync::SyncEngine;

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_branches(
    refresh: bool,
    as_json: bool,
    db_path: &Path,
    config: &CliConfig,
) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;

    if refresh {
        if let Some(api) = &session.remote {
            let engine = SyncEngine::new(&session.db, api);
            if let Err(error) = engine.refresh_branches().await {
                // The cached list below is the offline fallback
                eprintln!("Branch refresh failed ({error}); showing cached list");
            }
        } else {
            return Err(CliError::SyncNotConfigured);
        }
    }

    let branches = LibSqlBranchRepository::new(session.db.connection())
        .list()
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&branches)?);
        return Ok(());
    }

    if branches.is_empty() {
        println!("No branches cached. Run `tally branches --refresh` while online.");
        return Ok(());
    }

    for branch in branches {
        println!("{:>4}  {:<10} {}", branch.id, branch.code, branch.description);
    }
    Ok(())
}
