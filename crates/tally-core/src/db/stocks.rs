//! Stock repository implementation

use crate::error::{map_unique_violation, Error, Result};
use crate::models::Stock;
use libsql::{params, Connection, Row};

/// Trait for stock storage operations
pub trait StockRepository {
    /// Insert a stock row with `synced = 0`, returning the local id
    async fn insert(
        &self,
        product_id: i64,
        branch_id: i64,
        batch: &str,
        quantity: i64,
        now: i64,
    ) -> Result<i64>;

    /// Get the stock row for a product in a branch, if any
    async fn get_for_product(&self, product_id: i64, branch_id: i64) -> Result<Option<Stock>>;

    /// Set a row's quantity and flag it for re-upload
    async fn update_quantity(&self, stock_id: i64, quantity: i64, now: i64) -> Result<()>;

    /// Mark a row confirmed on the server
    async fn mark_synced(&self, stock_id: i64, now: i64) -> Result<()>;

    /// Remove every stock row belonging to a product, returning the count
    async fn delete_for_product(&self, product_id: i64) -> Result<u64>;

    /// Number of rows still awaiting upload
    async fn count_unsynced(&self) -> Result<i64>;
}

/// libSQL implementation of `StockRepository`
pub struct LibSqlStockRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlStockRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a stock row from a database row
    fn parse_stock(row: &Row) -> Result<Stock> {
        Ok(Stock {
            id: row.get(0)?,
            product_id: row.get(1)?,
            branch_id: row.get(2)?,
            batch: row.get(3)?,
            quantity: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            synced: row.get::<i64>(7)? != 0,
        })
    }
}

impl StockRepository for LibSqlStockRepository<'_> {
    async fn insert(
        &self,
        product_id: i64,
        branch_id: i64,
        batch: &str,
        quantity: i64,
        now: i64,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO stocks (product_id, branch_id, batch, quantity, created_at, updated_at, synced)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![product_id, branch_id, batch, quantity, now, now],
            )
            .await
            .map_err(|error| {
                map_unique_violation(error, "stocks(product_id, branch_id, batch)")
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    async fn get_for_product(&self, product_id: i64, branch_id: i64) -> Result<Option<Stock>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, product_id, branch_id, batch, quantity, created_at, updated_at, synced
                 FROM stocks
                 WHERE product_id = ?1 AND branch_id = ?2
                 ORDER BY id
                 LIMIT 1",
                params![product_id, branch_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_stock(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_quantity(&self, stock_id: i64, quantity: i64, now: i64) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE stocks SET quantity = ?1, updated_at = ?2, synced = 0 WHERE id = ?3",
                params![quantity, now, stock_id],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("stock {stock_id}")));
        }
        Ok(())
    }

    async fn mark_synced(&self, stock_id: i64, now: i64) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE stocks SET synced = 1, updated_at = ?1 WHERE id = ?2",
                params![now, stock_id],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("stock {stock_id}")));
        }
        Ok(())
    }

    async fn delete_for_product(&self, product_id: i64) -> Result<u64> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM stocks WHERE product_id = ?1",
                params![product_id],
            )
            .await?;
        Ok(rows)
    }

    async fn count_unsynced(&self) -> Result<i64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM stocks WHERE synced = 0", ())
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| Error::NotFound("unsynced count".to_string()))?;
        Ok(row.get(0)?)
    }
}
