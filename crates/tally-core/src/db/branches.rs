//! Branch repository implementation
//!
//! Branch rows are owned by the bulk refresh; everything else reads them.

use crate::error::Result;
use crate::models::Branch;
use libsql::{params, Connection};

/// libSQL repository for the local branch cache
pub struct LibSqlBranchRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlBranchRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Replace the cached rows by id with a fresh server snapshot
    pub async fn replace_all(&self, branches: &[Branch]) -> Result<usize> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for branch in branches {
            let result = self
                .conn
                .execute(
                    "INSERT OR REPLACE INTO branches (id, code, description) VALUES (?1, ?2, ?3)",
                    params![branch.id, branch.code.as_str(), branch.description.as_str()],
                )
                .await;

            if let Err(e) = result {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(branches.len())
    }

    /// List cached branches, ordered by id
    pub async fn list(&self) -> Result<Vec<Branch>> {
        let mut rows = self
            .conn
            .query("SELECT id, code, description FROM branches ORDER BY id", ())
            .await?;

        let mut branches = Vec::new();
        while let Some(row) = rows.next().await? {
            branches.push(Branch {
                id: row.get(0)?,
                code: row.get(1)?,
                description: row.get(2)?,
            });
        }

        Ok(branches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    fn branch(id: i64, code: &str, description: &str) -> Branch {
        Branch {
            id,
            code: code.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_replace_all_upserts_by_id() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlBranchRepository::new(db.connection());

        repo.replace_all(&[branch(1, "HQ", "Head office"), branch(2, "WH", "Warehouse")])
            .await
            .unwrap();

        // Refresh with a renamed branch 2 updates it in place
        repo.replace_all(&[branch(2, "WH2", "New warehouse")])
            .await
            .unwrap();

        let branches = repo.list().await.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[1].code, "WH2");
        assert_eq!(branches[0].code, "HQ");
    }
}
