use std::path::Path;

use tally_core::offline::{check_code_available, save_product_offline};
use tally_core::remote::HttpApi;
use tally_core::sync::SyncEngine;
use tally_core::ProductDraft;

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_add(
    draft: ProductDraft,
    branch_id: i64,
    db_path: &Path,
    config: &CliConfig,
) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;
    let online = session.is_online().await;

    // Pre-validate the code so the caller sees a named conflict instead of
    // a raw constraint violation
    let remote = if online { session.remote.as_ref() } else { None };
    let availability =
        check_code_available::<HttpApi>(&session.db, remote, branch_id, &draft.code).await?;
    if let Some(origin) = availability.source {
        return Err(CliError::CodeTaken {
            code: draft.code,
            origin,
        });
    }

    let id = save_product_offline(&session.db, &draft, branch_id).await?;
    println!("{id}");

    if online {
        if let Some(api) = &session.remote {
            let engine = SyncEngine::new(&session.db, api);
            match engine.sync_products().await {
                Ok(report) if report.failed == 0 => {}
                Ok(report) => {
                    eprintln!("Saved locally; {} row(s) still pending sync", report.failed);
                }
                Err(error) => {
                    // Local persistence already succeeded; the upload waits
                    // for the next sync
                    eprintln!("Saved locally; sync pending ({error})");
                }
            }
        }
    }

    Ok(())
}
