//! Offline write path
//!
//! Accepts product and stock writes regardless of connectivity. Every write
//! lands in the local store with `synced = 0`; the sync engine uploads it
//! later. Branch context is always an explicit argument, never ambient
//! state.

use serde::Serialize;

use crate::db::{
    Database, LibSqlProductRepository, LibSqlStockLogRepository, LibSqlStockRepository,
    ProductRepository, StockRepository,
};
use crate::error::{Error, Result};
use crate::models::{now_millis, ProductDraft, StockLog, StockView};
use crate::remote::RemoteApi;

/// Where a taken product code was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSource {
    /// An unsynced local row already uses the code
    Local,
    /// The server (or a confirmed local mirror of it) already uses the code
    Remote,
}

/// Result of a product code availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeAvailability {
    /// Whether the code is already taken
    pub exists: bool,
    /// Conflict source when taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ConflictSource>,
}

impl CodeAvailability {
    const fn free() -> Self {
        Self {
            exists: false,
            source: None,
        }
    }

    const fn taken(source: ConflictSource) -> Self {
        Self {
            exists: true,
            source: Some(source),
        }
    }
}

/// One requested quantity change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    /// Product whose stock row changes (local id)
    pub product_id: i64,
    /// Requested quantity; floored at zero before applying
    pub new_quantity: i64,
}

/// Check whether a product code is free, and if taken, where the conflict
/// comes from
///
/// Pass the remote client only when the device is online; without it the
/// check answers from local state alone. A failed live lookup downgrades to
/// the local answer rather than failing the check.
pub async fn check_code_available<A: RemoteApi>(
    db: &Database,
    remote: Option<&A>,
    branch_id: i64,
    code: &str,
) -> Result<CodeAvailability> {
    let products = LibSqlProductRepository::new(db.connection());

    if let Some(product) = products.find_by_code(code).await? {
        // A confirmed local row mirrors a server row, so the conflict is
        // effectively remote; only a pending row counts as local.
        let source = if product.synced {
            ConflictSource::Remote
        } else {
            ConflictSource::Local
        };
        return Ok(CodeAvailability::taken(source));
    }

    if let Some(api) = remote {
        match api.list_stock(branch_id, Some(code)).await {
            Ok(rows) => {
                if rows.iter().any(|row| row.code == code) {
                    return Ok(CodeAvailability::taken(ConflictSource::Remote));
                }
            }
            Err(error) => {
                tracing::debug!("Remote code lookup failed, using local answer: {error}");
            }
        }
    }

    Ok(CodeAvailability::free())
}

/// Save a product and its stock row locally with `synced = 0`
///
/// The two inserts run in one transaction: a crash between them can never
/// leave a product without stock. Returns the local product id.
pub async fn save_product_offline(
    db: &Database,
    draft: &ProductDraft,
    branch_id: i64,
) -> Result<i64> {
    if draft.code.trim().is_empty() {
        return Err(Error::InvalidInput("product code must not be empty".to_string()));
    }

    let conn = db.connection();
    let products = LibSqlProductRepository::new(conn);
    let stocks = LibSqlStockRepository::new(conn);
    let now = now_millis();
    let quantity = draft.quantity.max(0);

    conn.execute("BEGIN TRANSACTION", ()).await?;

    let product_id = match products.insert(draft, now).await {
        Ok(id) => id,
        Err(e) => {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }
    };

    if let Err(e) = stocks
        .insert(product_id, branch_id, &draft.batch, quantity, now)
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::debug!("Saved product {product_id} ({}) offline", draft.code);
    Ok(product_id)
}

/// Update a product's content and its stock row in a branch, flagging both
/// for re-upload
pub async fn update_product_offline(
    db: &Database,
    product_id: i64,
    draft: &ProductDraft,
    branch_id: i64,
) -> Result<()> {
    let conn = db.connection();
    let products = LibSqlProductRepository::new(conn);
    let stocks = LibSqlStockRepository::new(conn);
    let now = now_millis();

    let stock = stocks
        .get_for_product(product_id, branch_id)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("stock for product {product_id} in branch {branch_id}"))
        })?;

    conn.execute("BEGIN TRANSACTION", ()).await?;

    if let Err(e) = products.update(product_id, draft, now).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = stocks
        .update_quantity(stock.id, draft.quantity.max(0), now)
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    Ok(())
}

/// Apply quantity adjustments for a branch, one log entry per change
///
/// Quantities are floored at zero: decrementing past zero stores zero. The
/// log records the requested change exactly as applied, so
/// `quantity_change == new_quantity - old_quantity` even when floored.
pub async fn adjust_stock_quantity(
    db: &Database,
    adjustments: &[StockAdjustment],
    branch_id: i64,
    user_id: Option<i64>,
) -> Result<Vec<StockLog>> {
    let conn = db.connection();
    let stocks = LibSqlStockRepository::new(conn);
    let logs = LibSqlStockLogRepository::new(conn);
    let now = now_millis();

    let mut applied = Vec::with_capacity(adjustments.len());

    for adjustment in adjustments {
        let stock = stocks
            .get_for_product(adjustment.product_id, branch_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "stock for product {} in branch {branch_id}",
                    adjustment.product_id
                ))
            })?;

        let new_quantity = adjustment.new_quantity.max(0);

        conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = stocks.update_quantity(stock.id, new_quantity, now).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        let log = match logs
            .append(
                user_id,
                branch_id,
                adjustment.product_id,
                stock.quantity,
                new_quantity,
            )
            .await
        {
            Ok(log) => log,
            Err(e) => {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        };

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        applied.push(log);
    }

    Ok(applied)
}

/// Remove a product and its stock rows from the local store
///
/// A product deleted before it ever synced disappears without further
/// trace; the server never knew about it.
pub async fn delete_product(db: &Database, product_id: i64) -> Result<()> {
    let conn = db.connection();
    let products = LibSqlProductRepository::new(conn);
    let stocks = LibSqlStockRepository::new(conn);

    conn.execute("BEGIN TRANSACTION", ()).await?;

    if let Err(e) = stocks.delete_for_product(product_id).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = products.delete(product_id).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::debug!("Deleted product {product_id} locally");
    Ok(())
}

/// List a branch's stock from the local store, normalized to `StockView`
///
/// The offline counterpart of the remote branch listing; an optional search
/// term matches against product code and name.
pub async fn list_stock(
    db: &Database,
    branch_id: i64,
    search: Option<&str>,
) -> Result<Vec<StockView>> {
    let conn = db.connection();

    let base = "SELECT p.id, p.code, p.name, p.description, p.price,
                       s.id, s.branch_id, s.batch, s.quantity,
                       (p.synced AND s.synced)
                FROM stocks s
                JOIN products p ON p.id = s.product_id
                WHERE s.branch_id = ?1";

    let mut rows = if let Some(term) = search {
        let pattern = format!("%{term}%");
        conn.query(
            &format!("{base} AND (p.code LIKE ?2 OR p.name LIKE ?2) ORDER BY s.id"),
            libsql::params![branch_id, pattern],
        )
        .await?
    } else {
        conn.query(
            &format!("{base} ORDER BY s.id"),
            libsql::params![branch_id],
        )
        .await?
    };

    let mut views = Vec::new();
    while let Some(row) = rows.next().await? {
        views.push(StockView {
            product_id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price: row.get(4)?,
            stock_id: row.get(5)?,
            branch_id: row.get(6)?,
            batch: row.get(7)?,
            quantity: row.get(8)?,
            synced: row.get::<i64>(9)? != 0,
        });
    }

    Ok(views)
}
