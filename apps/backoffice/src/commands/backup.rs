//! # Backup Commands
//!
//! ```text
//! backup_database  ──► <data_dir>/backups/2025_03_01_10_30_00_backup.sqlite
//! restore_database ──► validates, keeps <db>.pre-restore, swaps the pool
//! list_backups     ──► *.sqlite in the backups dir, newest first
//! ```

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use teis_reports::report_file_name;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{ConfigState, DbState};

const BACKUP_EXT: &str = "sqlite";

/// A backup file on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Snapshots the live database into the backups directory.
pub async fn backup_database(db: &DbState, config: &ConfigState) -> ApiResult<BackupInfo> {
    let dir = config.backups_dir();
    debug!(dir = %dir.display(), "backup_database command");

    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(report_file_name(
        Local::now().naive_local(),
        "backup",
        BACKUP_EXT,
    ));
    let bytes = db.get().await.backup_to(&path).await?;

    Ok(BackupInfo { path, bytes })
}

/// Replaces the live database with `source`.
pub async fn restore_database(db: &DbState, source: &Path) -> ApiResult<()> {
    debug!(source = %source.display(), "restore_database command");

    if db.config().is_in_memory() {
        return Err(ApiError::new(
            ErrorCode::BackupError,
            "an in-memory database cannot be restored",
        ));
    }

    db.restore_from(source).await?;
    info!(source = %source.display(), "Restore complete");
    Ok(())
}

/// Backups in the backups directory, newest first.
pub async fn list_backups(config: &ConfigState) -> ApiResult<Vec<BackupInfo>> {
    let dir = config.backups_dir();
    debug!(dir = %dir.display(), "list_backups command");

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == BACKUP_EXT) {
            let bytes = entry.metadata().await?.len();
            backups.push(BackupInfo { path, bytes });
        }
    }

    // timestamped names sort chronologically
    backups.sort_by(|a, b| b.path.cmp(&a.path));
    Ok(backups)
}
