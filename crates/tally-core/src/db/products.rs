//! Product repository implementation

use crate::error::{map_unique_violation, Error, Result};
use crate::models::{Product, ProductDraft};
use libsql::{params, Connection, Row};

/// Trait for product storage operations
pub trait ProductRepository {
    /// Insert a product with `synced = 0`, returning the local id
    async fn insert(&self, draft: &ProductDraft, now: i64) -> Result<i64>;

    /// Get a product by local id
    async fn get(&self, id: i64) -> Result<Option<Product>>;

    /// Find a product by its business code
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>>;

    /// Update product content and flag the row for re-upload
    async fn update(&self, id: i64, draft: &ProductDraft, now: i64) -> Result<()>;

    /// Remove a product row
    async fn delete(&self, id: i64) -> Result<()>;

    /// Record the server-assigned id and mark the row confirmed
    async fn mark_synced(&self, id: i64, server_id: i64, now: i64) -> Result<()>;

    /// Number of rows still awaiting upload
    async fn count_unsynced(&self) -> Result<i64>;
}

/// libSQL implementation of `ProductRepository`
pub struct LibSqlProductRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlProductRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a product from a database row
    fn parse_product(row: &Row) -> Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            server_id: row.get(1)?,
            code: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            price: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            synced: row.get::<i64>(8)? != 0,
        })
    }

    async fn query_one(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<Option<Product>> {
        let mut rows = self.conn.query(sql, params).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_product(&row)?)),
            None => Ok(None),
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, server_id, code, name, description, price, created_at, updated_at, synced";

impl ProductRepository for LibSqlProductRepository<'_> {
    async fn insert(&self, draft: &ProductDraft, now: i64) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO products (code, name, description, price, created_at, updated_at, synced)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![
                    draft.code.as_str(),
                    draft.name.as_str(),
                    draft.description.as_str(),
                    draft.price,
                    now,
                    now
                ],
            )
            .await
            .map_err(|error| map_unique_violation(error, "products.code"))?;

        Ok(self.conn.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>> {
        self.query_one(
            &format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"),
            params![id],
        )
        .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        self.query_one(
            &format!("SELECT {SELECT_COLUMNS} FROM products WHERE code = ?1"),
            params![code],
        )
        .await
    }

    async fn update(&self, id: i64, draft: &ProductDraft, now: i64) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE products
                 SET code = ?1, name = ?2, description = ?3, price = ?4, updated_at = ?5, synced = 0
                 WHERE id = ?6",
                params![
                    draft.code.as_str(),
                    draft.name.as_str(),
                    draft.description.as_str(),
                    draft.price,
                    now,
                    id
                ],
            )
            .await
            .map_err(|error| map_unique_violation(error, "products.code"))?;

        if rows == 0 {
            return Err(Error::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn mark_synced(&self, id: i64, server_id: i64, now: i64) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE products SET server_id = ?1, synced = 1, updated_at = ?2 WHERE id = ?3",
                params![server_id, now, id],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn count_unsynced(&self) -> Result<i64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM products WHERE synced = 0", ())
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| Error::NotFound("unsynced count".to_string()))?;
        Ok(row.get(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::now_millis;
    use pretty_assertions::assert_eq;

    fn draft(code: &str) -> ProductDraft {
        ProductDraft {
            code: code.to_string(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
            quantity: 5,
            batch: "B1".to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_insert_and_get() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        let id = repo.insert(&draft("000111"), now_millis()).await.unwrap();
        let product = repo.get(id).await.unwrap().unwrap();

        assert_eq!(product.code, "000111");
        assert_eq!(product.name, "Widget");
        assert_eq!(product.server_id, None);
        assert!(!product.synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_code_is_constraint_violation() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        repo.insert(&draft("dup"), now_millis()).await.unwrap();
        let err = repo.insert(&draft("dup"), now_millis()).await.unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_find_by_code() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        repo.insert(&draft("abc"), now_millis()).await.unwrap();
        assert!(repo.find_by_code("abc").await.unwrap().is_some());
        assert!(repo.find_by_code("missing").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_synced_records_server_id() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        let id = repo.insert(&draft("abc"), now_millis()).await.unwrap();
        repo.mark_synced(id, 4242, now_millis()).await.unwrap();

        let product = repo.get(id).await.unwrap().unwrap();
        assert_eq!(product.server_id, Some(4242));
        assert!(product.synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_resets_synced() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        let id = repo.insert(&draft("abc"), now_millis()).await.unwrap();
        repo.mark_synced(id, 7, now_millis()).await.unwrap();

        let mut updated = draft("abc");
        updated.name = "Widget v2".to_string();
        repo.update(id, &updated, now_millis()).await.unwrap();

        let product = repo.get(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Widget v2");
        assert!(!product.synced);
        // server id survives a content update
        assert_eq!(product.server_id, Some(7));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_rows_are_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlProductRepository::new(db.connection());

        assert!(matches!(
            repo.delete(99).await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            repo.update(99, &draft("x"), now_millis()).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
