//! Database connection management

use crate::error::{Error, Result};
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;

use super::migrations;

/// Database wrapper for libSQL connections
///
/// One instance per device; all store access flows through the wrapped
/// connection, which serializes writes under the single-logical-writer
/// model.
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
}

impl Database {
    /// Open a local database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically. Fails with `StorageUnavailable` when
    /// the database file cannot be opened at all.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = Builder::new_local(&path_str)
            .build()
            .await
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;
        let conn = db
            .connect()
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;
        let conn = db
            .connect()
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Configure `SQLite` for the access patterns of the store
    async fn configure(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok(); // not supported on :memory:
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        self.conn.execute("PRAGMA foreign_keys = ON;", ()).await?;
        Ok(())
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn).await
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().await.unwrap();
        let mut rows = db.connection().query("SELECT 1", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_creates_file_and_survives_reopen() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("tally.db");

        {
            let db = Database::open(&db_path).await.unwrap();
            db.connection()
                .execute(
                    "INSERT INTO branches (id, code, description) VALUES (1, 'HQ', 'Head office')",
                    (),
                )
                .await
                .unwrap();
        }

        let db = Database::open(&db_path).await.unwrap();
        let mut rows = db
            .connection()
            .query("SELECT code FROM branches WHERE id = 1", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "HQ");
    }
}
