use std::path::Path;

use serde::Serialize;
use tally_core::db::Database;
use tally_core::net::Connectivity;
use tally_core::remote::HttpApi;
use tally_core::StockView;

use crate::config::CliConfig;
use crate::error::CliError;

/// Everything a command needs: the open store plus the remote client and
/// connectivity probe, when configured
pub struct Session {
    pub db: Database,
    pub remote: Option<HttpApi>,
    probe: Option<Connectivity>,
}

impl Session {
    pub async fn open(db_path: &Path, config: &CliConfig) -> Result<Self, CliError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(db_path).await?;
        tracing::debug!("Opened database at {}", db_path.display());

        let (remote, probe) = match (&config.api_url, &config.api_token) {
            (Some(url), Some(token)) => (
                Some(HttpApi::new(url.clone(), token.clone())?),
                Some(Connectivity::new(url.clone())?),
            ),
            _ => (None, None),
        };

        Ok(Self { db, remote, probe })
    }

    /// Probe connectivity; unconfigured sessions always read offline
    pub async fn is_online(&self) -> bool {
        match &self.probe {
            Some(probe) => probe.is_online().await,
            None => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockListItem {
    pub product_id: i64,
    pub code: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub batch: String,
    pub branch_id: i64,
    pub synced: bool,
}

pub fn stock_to_item(view: &StockView) -> StockListItem {
    StockListItem {
        product_id: view.product_id,
        code: view.code.clone(),
        name: view.name.clone(),
        price: view.price,
        quantity: view.quantity,
        batch: view.batch.clone(),
        branch_id: view.branch_id,
        synced: view.synced,
    }
}

pub fn format_stock_lines(views: &[StockView]) -> Vec<String> {
    views
        .iter()
        .map(|view| {
            let marker = if view.synced { ' ' } else { '*' };
            format!(
                "{marker} {:>6}  {:<12} {:<24} qty {:>5}  batch {:<8} {:>10.2}",
                view.product_id, view.code, view.name, view.quantity, view.batch, view.price
            )
        })
        .collect()
}
