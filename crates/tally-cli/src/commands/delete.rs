use std::path::Path;

use tally_core::db::{LibSqlProductRepository, ProductRepository};
use tally_core::offline::delete_product;
use tally_core::remote::RemoteApi;
use tally_core::Error;

use crate::commands::common::Session;
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_delete(id: i64, db_path: &Path, config: &CliConfig) -> Result<(), CliError> {
    let session = Session::open(db_path, config).await?;

    let product = LibSqlProductRepository::new(session.db.connection())
        .get(id)
        .await?
        .ok_or_else(|| CliError::Core(Error::NotFound(format!("product {id}"))))?;

    // A product the server knows about is deleted there too; one it never
    // saw just disappears locally
    if let Some(server_id) = product.server_id {
        if session.is_online().await {
            if let Some(api) = &session.remote {
                if let Err(error) = api.delete_product(server_id).await {
                    eprintln!("Remote delete failed ({error}); removing local copy only");
                }
            }
        }
    }

    delete_product(&session.db, id).await?;
    println!("{id}");
    Ok(())
}
