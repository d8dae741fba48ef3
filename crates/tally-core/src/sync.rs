//! Sync engine
//!
//! Reconciles pending local writes with the remote system of record. A pass
//! walks every unsynced product/stock pair in insertion order and replays it
//! as one combined create or update request, so a stock row never reaches
//! the server before its product. Rows fail independently; a failed row
//! stays unsynced and is retried on the next explicit invocation.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::db::{
    Database, LibSqlBranchRepository, LibSqlProductRepository, LibSqlStockRepository,
    ProductRepository, StockRepository,
};
use crate::error::{Error, Result};
use crate::models::{now_millis, Product, Stock};
use crate::remote::{ProductUpload, RemoteApi};

/// Outcome of one sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SyncReport {
    /// Rows that were pending when the pass started
    pub attempted: usize,
    /// Rows confirmed by the remote during this pass
    pub synced: usize,
    /// Rows left unsynced for the next pass
    pub failed: usize,
}

struct PendingRow {
    product: Product,
    stock: Stock,
}

/// Replays unsynced rows against the remote API
///
/// Invoked explicitly; there is no background scheduler. At most one pass
/// may run per engine at a time: a second invocation while one is in
/// flight is rejected with `SyncInFlight`.
pub struct SyncEngine<'a, A: RemoteApi> {
    db: &'a Database,
    remote: &'a A,
    in_flight: AtomicBool,
}

impl<'a, A: RemoteApi> SyncEngine<'a, A> {
    /// Create an engine over the given store and remote client
    pub const fn new(db: &'a Database, remote: &'a A) -> Self {
        Self {
            db,
            remote,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Upload every pending product/stock pair, marking rows synced on
    /// success
    ///
    /// Partial failure is expected and tolerated: one row's failure never
    /// aborts the batch. A 401 does abort the pass, since every following
    /// request would be rejected the same way.
    pub async fn sync_products(&self) -> Result<SyncReport> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SyncInFlight)?;

        let result = self.run_pass().await;
        self.in_flight.store(false, Ordering::Release);
        result
    }

    async fn run_pass(&self) -> Result<SyncReport> {
        let pending = self.pending_rows().await?;
        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };

        if pending.is_empty() {
            tracing::debug!("Nothing to sync");
            return Ok(report);
        }

        for row in pending {
            let upload = ProductUpload::from_rows(&row.product, &row.stock);

            let outcome = match row.product.server_id {
                None => {
                    self.remote
                        .create_product(row.stock.branch_id, &upload)
                        .await
                }
                Some(server_id) => self
                    .remote
                    .update_product(row.stock.branch_id, server_id, &upload)
                    .await
                    .map(|()| server_id),
            };

            match outcome {
                Ok(server_id) => {
                    self.mark_row_synced(&row, server_id).await?;
                    report.synced += 1;
                }
                Err(Error::Unauthorized) => return Err(Error::Unauthorized),
                Err(error) => {
                    tracing::warn!(
                        "Sync failed for product {} ({}): {error}",
                        row.product.id,
                        row.product.code
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Sync pass finished: {} synced, {} failed of {}",
            report.synced,
            report.failed,
            report.attempted
        );
        Ok(report)
    }

    /// Unsynced product/stock pairs in insertion order
    async fn pending_rows(&self) -> Result<Vec<PendingRow>> {
        let mut rows = self
            .db
            .connection()
            .query(
                "SELECT p.id, p.server_id, p.code, p.name, p.description, p.price,
                        p.created_at, p.updated_at, p.synced,
                        s.id, s.product_id, s.branch_id, s.batch, s.quantity,
                        s.created_at, s.updated_at, s.synced
                 FROM stocks s
                 JOIN products p ON p.id = s.product_id
                 WHERE s.synced = 0 OR p.synced = 0
                 ORDER BY s.id",
                (),
            )
            .await?;

        let mut pending = Vec::new();
        while let Some(row) = rows.next().await? {
            pending.push(PendingRow {
                product: Product {
                    id: row.get(0)?,
                    server_id: row.get(1)?,
                    code: row.get(2)?,
                    name: row.get(3)?,
                    description: row.get(4)?,
                    price: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                    synced: row.get::<i64>(8)? != 0,
                },
                stock: Stock {
                    id: row.get(9)?,
                    product_id: row.get(10)?,
                    branch_id: row.get(11)?,
                    batch: row.get(12)?,
                    quantity: row.get(13)?,
                    created_at: row.get(14)?,
                    updated_at: row.get(15)?,
                    synced: row.get::<i64>(16)? != 0,
                },
            });
        }

        Ok(pending)
    }

    /// Mark both halves of a pair confirmed, in one transaction
    async fn mark_row_synced(&self, row: &PendingRow, server_id: i64) -> Result<()> {
        let conn = self.db.connection();
        let products = LibSqlProductRepository::new(conn);
        let stocks = LibSqlStockRepository::new(conn);
        let now = now_millis();

        conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = products.mark_synced(row.product.id, server_id, now).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        if let Err(e) = stocks.mark_synced(row.stock.id, now).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    /// Fetch the branch list and replace the local cache by id
    ///
    /// On network failure the cache keeps its previous snapshot; the read
    /// path serves it as the offline fallback.
    pub async fn refresh_branches(&self) -> Result<usize> {
        let branches = self.remote.list_branches().await?;
        let count = LibSqlBranchRepository::new(self.db.connection())
            .replace_all(&branches)
            .await?;
        tracing::debug!("Refreshed {count} branches");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, ProductDraft};
    use crate::offline::save_product_offline;
    use crate::remote::testing::FakeApi;
    use pretty_assertions::assert_eq;

    fn draft(code: &str, quantity: i64) -> ProductDraft {
        ProductDraft {
            code: code.to_string(),
            name: format!("Product {code}"),
            description: "stocked".to_string(),
            price: 9.99,
            quantity,
            batch: "B1".to_string(),
        }
    }

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_offline_save_then_sync_round_trip() {
        let db = setup().await;
        let api = FakeApi::new();

        let id = save_product_offline(&db, &draft("000111", 5), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        let report = engine.sync_products().await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                attempted: 1,
                synced: 1,
                failed: 0
            }
        );

        // Both rows are confirmed and the server id was recorded
        let products = LibSqlProductRepository::new(db.connection());
        let product = products.get(id).await.unwrap().unwrap();
        assert!(product.synced);
        assert_eq!(product.server_id, Some(100));

        let stocks = LibSqlStockRepository::new(db.connection());
        let stock = stocks.get_for_product(id, 2).await.unwrap().unwrap();
        assert!(stock.synced);

        // The submitted payload carried the locally recorded fields
        let created = api.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        let (branch_id, upload) = &created[0];
        assert_eq!(*branch_id, 2);
        assert_eq!(upload.code, "000111");
        assert_eq!(upload.quantity, 5);
        assert_eq!(upload.batch, "B1");
        assert!((upload.price - 9.99).abs() < f64::EPSILON);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_pass_is_a_no_op() {
        let db = setup().await;
        let api = FakeApi::new();
        save_product_offline(&db, &draft("000111", 5), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        engine.sync_products().await.unwrap();

        let report = engine.sync_products().await.unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(api.created.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_partial_failure_is_isolated_per_row() {
        let db = setup().await;
        let api = FakeApi::new().failing("b-fails");

        save_product_offline(&db, &draft("a-ok", 1), 2).await.unwrap();
        let failing = save_product_offline(&db, &draft("b-fails", 2), 2).await.unwrap();
        save_product_offline(&db, &draft("c-ok", 3), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        let report = engine.sync_products().await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                attempted: 3,
                synced: 2,
                failed: 1
            }
        );

        let products = LibSqlProductRepository::new(db.connection());
        let stuck = products.get(failing).await.unwrap().unwrap();
        assert!(!stuck.synced);

        // The next pass retries exactly the failed row
        let report = engine.sync_products().await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_updated_rows_replay_through_update_endpoint() {
        let db = setup().await;
        let api = FakeApi::new();
        let id = save_product_offline(&db, &draft("000111", 5), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        engine.sync_products().await.unwrap();

        // Content edit flags the pair again
        let mut edited = draft("000111", 7);
        edited.name = "Renamed".to_string();
        crate::offline::update_product_offline(&db, id, &edited, 2)
            .await
            .unwrap();

        let report = engine.sync_products().await.unwrap();
        assert_eq!(report.synced, 1);

        let updated = api.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let (branch_id, server_id, upload) = &updated[0];
        assert_eq!(*branch_id, 2);
        assert_eq!(*server_id, 100);
        assert_eq!(upload.name, "Renamed");
        assert_eq!(upload.quantity, 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_invocation_is_rejected() {
        let db = setup().await;
        let api = FakeApi::new();
        save_product_offline(&db, &draft("000111", 5), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        let (first, second) = tokio::join!(engine.sync_products(), engine.sync_products());

        // The first pass holds the guard across its suspension point; the
        // re-entrant call is rejected.
        assert!(first.is_ok());
        assert!(matches!(second.unwrap_err(), Error::SyncInFlight));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unauthorized_aborts_pass_and_releases_guard() {
        let db = setup().await;
        let mut api = FakeApi::new();
        api.unauthorized = true;
        save_product_offline(&db, &draft("000111", 5), 2).await.unwrap();

        let engine = SyncEngine::new(&db, &api);
        let err = engine.sync_products().await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        // The row is still pending and the engine accepts a new pass
        let err = engine.sync_products().await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_refresh_branches_replaces_by_id() {
        let db = setup().await;
        let api = FakeApi::new().with_branches(vec![
            Branch {
                id: 1,
                code: "HQ".to_string(),
                description: "Head office".to_string(),
            },
            Branch {
                id: 2,
                code: "WH".to_string(),
                description: "Warehouse".to_string(),
            },
        ]);

        let engine = SyncEngine::new(&db, &api);
        assert_eq!(engine.refresh_branches().await.unwrap(), 2);

        let cached = LibSqlBranchRepository::new(db.connection())
            .list()
            .await
            .unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].code, "HQ");
    }
}
