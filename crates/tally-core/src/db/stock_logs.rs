//! Stock log repository implementation
//!
//! Logs are append-only: there is no update or delete surface here.

use crate::error::{Error, Result};
use crate::models::{now_millis, StockAction, StockLog};
use libsql::{params, Connection, Row};

/// libSQL repository for the local stock audit trail
pub struct LibSqlStockLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlStockLogRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append a quantity-change record
    pub async fn append(
        &self,
        user_id: Option<i64>,
        branch_id: i64,
        product_id: i64,
        old_quantity: i64,
        new_quantity: i64,
    ) -> Result<StockLog> {
        let now = now_millis();
        let quantity_change = new_quantity - old_quantity;
        let action = StockAction::classify(old_quantity, new_quantity);

        self.conn
            .execute(
                "INSERT INTO stock_logs
                 (user_id, branch_id, product_id, old_quantity, new_quantity, quantity_change, action, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    user_id,
                    branch_id,
                    product_id,
                    old_quantity,
                    new_quantity,
                    quantity_change,
                    action.as_str(),
                    now,
                    now
                ],
            )
            .await?;

        Ok(StockLog {
            id: self.conn.last_insert_rowid(),
            user_id,
            branch_id,
            product_id,
            old_quantity,
            new_quantity,
            quantity_change,
            action,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a product's log entries, newest first
    pub async fn list_for_product(&self, product_id: i64, limit: usize) -> Result<Vec<StockLog>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, branch_id, product_id, old_quantity, new_quantity, quantity_change, action, created_at, updated_at
                 FROM stock_logs
                 WHERE product_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
                params![product_id, limit as i64],
            )
            .await?;

        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(Self::parse_log(&row)?);
        }

        Ok(logs)
    }

    fn parse_log(row: &Row) -> Result<StockLog> {
        let action: String = row.get(7)?;
        Ok(StockLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            branch_id: row.get(2)?,
            product_id: row.get(3)?,
            old_quantity: row.get(4)?,
            new_quantity: row.get(5)?,
            quantity_change: row.get(6)?,
            action: action
                .parse()
                .map_err(|message: String| Error::InvalidInput(message))?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_append_and_list() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlStockLogRepository::new(db.connection());

        let log = repo.append(Some(7), 2, 1, 5, 8).await.unwrap();
        assert_eq!(log.quantity_change, 3);
        assert_eq!(log.action, StockAction::Increment);

        repo.append(None, 2, 1, 8, 0).await.unwrap();

        let logs = repo.list_for_product(1, 10).await.unwrap();
        assert_eq!(logs.len(), 2);
        // Newest first
        assert_eq!(logs[0].action, StockAction::Decrement);
        assert_eq!(logs[0].quantity_change, -8);
        assert_eq!(logs[0].user_id, None);
        assert_eq!(logs[1].user_id, Some(7));
    }
}
