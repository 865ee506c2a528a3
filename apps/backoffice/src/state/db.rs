//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! ## Thread Safety
//! `Database` holds a `SqlitePool`, which is already thread-safe. The
//! `RwLock` is only taken for writing by restore, so no command starts
//! while the tables are being replaced.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_customers(db: &DbState, show_all: bool) -> ApiResult<Vec<CustomerDto>> {
//!     let customers = db.get().await.customers().list(show_all).await?;
//!     Ok(customers.into_iter().map(CustomerDto::from).collect())
//! }
//! ```

use std::path::Path;

use teis_db::{backup, Database, DbConfig, DbResult};
use tokio::sync::RwLock;
use tracing::info;

/// Database handle plus the config it was opened with.
#[derive(Debug)]
pub struct DbState {
    db: RwLock<Database>,
    config: DbConfig,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database, config: DbConfig) -> Self {
        DbState {
            db: RwLock::new(db),
            config,
        }
    }

    /// Opens the database described by `config`.
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        let db = Database::new(config.clone()).await?;
        Ok(DbState::new(db, config))
    }

    /// Returns a handle to the current database.
    ///
    /// The handle shares the pool.
    pub async fn get(&self) -> Database {
        self.db.read().await.clone()
    }

    /// Config the database was opened with.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Replaces the live data with the backup at `source`.
    ///
    /// The pool stays open; a failed restore leaves the data as it was.
    pub async fn restore_from(&self, source: &Path) -> DbResult<()> {
        let guard = self.db.write().await;
        backup::restore(&guard, &self.config, source).await?;
        info!(source = %source.display(), "Backup restored");
        Ok(())
    }

    /// Closes the pool. Call once on shutdown.
    pub async fn close(&self) {
        self.db.read().await.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_shares_pool() {
        let state = DbState::open(DbConfig::in_memory()).await.unwrap();
        let db = state.get().await;
        assert!(db.health_check().await);
        assert!(state.config().is_in_memory());
    }

    #[tokio::test]
    async fn test_restore_from_file_keeps_handles_valid() {
        let dir = tempfile::tempdir().unwrap();
        let state = DbState::open(DbConfig::new(dir.path().join("teis.db")))
            .await
            .unwrap();
        let handle = state.get().await;

        let snapshot = dir.path().join("snapshot.sqlite");
        handle.backup_to(&snapshot).await.unwrap();
        handle.settings().set("printer", "Epson").await.unwrap();

        state.restore_from(&snapshot).await.unwrap();

        // a handle taken before the restore sees the restored data
        assert!(handle.settings().get("printer").await.unwrap().is_none());
        state.close().await;
    }

    #[tokio::test]
    async fn test_restore_in_memory_keeps_working_handle() {
        let state = DbState::open(DbConfig::in_memory()).await.unwrap();
        let dir = tempfile::tempdir().unwrap();

        let result = state.restore_from(&dir.path().join("missing.sqlite")).await;
        assert!(result.is_err());
        assert!(state.get().await.health_check().await);
    }
}
