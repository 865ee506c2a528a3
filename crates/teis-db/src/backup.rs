//! # Backup and Restore
//!
//! Snapshot copies of the live database file.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BACKUP                                                                 │
//! │    VACUUM INTO '<dir>/2025_03_01_10_30_00_backup.sqlite'                │
//! │    (consistent even while WAL has uncommitted pages)                    │
//! │                                                                         │
//! │  RESTORE (through SQLite, the pool stays open)                          │
//! │    1. open source (never created), require a `customers` table         │
//! │    2. VACUUM INTO '<db>.pre-restore'                                   │
//! │    3. ATTACH source AS snapshot on one pooled connection               │
//! │    4. one transaction: empty the user tables, copy them from snapshot, │
//! │       copy their AUTOINCREMENT counters                                │
//! │    5. DETACH snapshot                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The live file is never replaced on disk, so the WAL and the other pooled
//! connections stay consistent. Reference data (provinces, municipalities)
//! comes from migrations and is left alone.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::{Database, DbConfig};

/// User tables restored from a backup, parents before children.
const RESTORED_TABLES: &[&str] = &["customers", "products", "invoices", "sales", "settings"];

fn backup_error(context: &str, err: impl std::fmt::Display) -> DbError {
    DbError::BackupFailed(format!("{context}: {err}"))
}

impl Database {
    /// Writes a consistent snapshot of the database to `dest`.
    ///
    /// `dest` must not exist yet. Returns the size of the written file.
    pub async fn backup_to(&self, dest: &Path) -> DbResult<u64> {
        if dest.exists() {
            return Err(DbError::BackupFailed(format!(
                "destination already exists: {}",
                dest.display()
            )));
        }

        let dest_str = dest.to_string_lossy().to_string();
        sqlx::query("VACUUM INTO ?1")
            .bind(&dest_str)
            .execute(self.pool())
            .await?;

        let size = tokio::fs::metadata(dest)
            .await
            .map_err(|e| backup_error("reading backup size", e))?
            .len();

        info!(path = %dest.display(), bytes = size, "Backup written");
        Ok(size)
    }
}

/// Checks that `source` is a SQLite file holding a Teis database.
pub async fn validate_backup(source: &Path) -> DbResult<()> {
    if !source.exists() {
        return Err(DbError::BackupFailed(format!(
            "backup file not found: {}",
            source.display()
        )));
    }

    let mut conn = SqliteConnectOptions::new()
        .filename(source)
        .create_if_missing(false)
        .connect()
        .await
        .map_err(|e| backup_error("not a SQLite database", e))?;

    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'customers'",
    )
    .fetch_one(&mut conn)
    .await
    .map_err(|e| backup_error("not a SQLite database", e))?;

    conn.close()
        .await
        .map_err(|e| backup_error("closing backup file", e))?;

    if tables == 0 {
        return Err(DbError::BackupFailed(
            "backup has no customers table".to_string(),
        ));
    }
    Ok(())
}

/// Replaces the contents of the live database with those of `source`.
///
/// The current contents are first saved next to the live file with a
/// `.pre-restore` suffix. The copy runs in one transaction: on error the
/// live data is untouched.
pub async fn restore(db: &Database, config: &DbConfig, source: &Path) -> DbResult<()> {
    if config.is_in_memory() {
        return Err(DbError::BackupFailed(
            "cannot restore into an in-memory database".to_string(),
        ));
    }

    validate_backup(source).await?;

    let safety = sidecar(&config.database_path, "pre-restore");
    if safety.exists() {
        tokio::fs::remove_file(&safety)
            .await
            .map_err(|e| backup_error("removing old safety copy", e))?;
    }
    info!(path = %safety.display(), "Creating safety backup");
    db.backup_to(&safety).await?;

    let mut conn = db.pool().acquire().await?;
    sqlx::query("ATTACH DATABASE ?1 AS snapshot")
        .bind(source.to_string_lossy().to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| backup_error("attaching backup", e))?;

    let copied = copy_snapshot(&mut conn).await;

    // ATTACH is per connection; never hand it back to the pool attached
    if let Err(e) = sqlx::query("DETACH DATABASE snapshot")
        .execute(&mut *conn)
        .await
    {
        warn!(error = %e, "Could not detach backup, dropping connection");
        drop(conn.detach());
    }

    let rows = copied?;
    info!(from = %source.display(), rows, "Database restored");
    Ok(())
}

/// Copies every restored table from the attached `snapshot` schema.
async fn copy_snapshot(conn: &mut SqliteConnection) -> DbResult<u64> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    for table in RESTORED_TABLES.iter().rev() {
        sqlx::query(&format!("DELETE FROM main.{table}"))
            .execute(&mut *tx)
            .await?;
    }

    let mut rows = 0;
    for table in RESTORED_TABLES {
        let copied = sqlx::query(&format!(
            "INSERT INTO main.{table} SELECT * FROM snapshot.{table}"
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| backup_error(&format!("copying {table}"), e))?
        .rows_affected();
        debug!(table, rows = copied, "Table restored");
        rows += copied;
    }

    // next invoice / product / sale ids continue from the backup
    let names = RESTORED_TABLES
        .iter()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(", ");
    sqlx::query(&format!(
        "DELETE FROM main.sqlite_sequence WHERE name IN ({names})"
    ))
    .execute(&mut *tx)
    .await?;
    sqlx::query(&format!(
        "INSERT INTO main.sqlite_sequence (name, seq) \
         SELECT name, seq FROM snapshot.sqlite_sequence WHERE name IN ({names})"
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(rows)
}

/// `teis.db` + `pre-restore` → `teis.db.pre-restore`
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

// =============================================================================
// Unit Tests
// =============================================================================
