//! # Settings Commands
//!
//! Key/value settings plus the theme manager operations.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState, ThemeManager};

/// Read-only view of the active configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    pub config: ConfigState,
    pub reports_dir: std::path::PathBuf,
    pub exports_dir: std::path::PathBuf,
    pub backups_dir: std::path::PathBuf,
}

/// Active configuration with derived directories.
pub fn get_config(config: &ConfigState) -> ConfigDto {
    ConfigDto {
        config: config.clone(),
        reports_dir: config.reports_dir(),
        exports_dir: config.exports_dir(),
        backups_dir: config.backups_dir(),
    }
}

/// All stored settings.
pub async fn list_settings(db: &DbState) -> ApiResult<BTreeMap<String, String>> {
    debug!("list_settings command");
    Ok(db.get().await.settings().all().await?)
}

/// One setting, `NotFound` when unset.
pub async fn get_setting(db: &DbState, key: &str) -> ApiResult<String> {
    debug!(key = %key, "get_setting command");
    db.get()
        .await
        .settings()
        .get(key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting", key))
}

/// Inserts or replaces a setting.
pub async fn save_setting(db: &DbState, key: &str, value: &str) -> ApiResult<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ApiError::validation("setting key is required"));
    }
    debug!(key = %key, "save_setting command");
    Ok(db.get().await.settings().set(key, value).await?)
}

/// Stylesheet names available to `change_theme`.
pub fn available_themes(themes: &ThemeManager) -> Vec<String> {
    themes.available_themes()
}

/// Switches theme, persisting the choice.
pub async fn change_theme(db: &DbState, themes: &mut ThemeManager, theme: &str) -> ApiResult<()> {
    debug!(theme = %theme, "change_theme command");
    themes.change_theme(&db.get().await, theme).await
}
