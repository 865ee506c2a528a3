//! # Theme Manager
//!
//! Keeps every registered view on the same stylesheet.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   settings.theme = "Dark"          styles/Dark.qss                      │
//! │           │                              │                              │
//! │           └──────────► ThemeManager ◄────┘                              │
//! │                         │    │    │                                     │
//! │            apply_stylesheet to every registered ThemeTarget             │
//! │                         ▼    ▼    ▼                                     │
//! │                    main window, dialogs, ...                            │
//! │                                                                         │
//! │   change_theme("Light"):                                                │
//! │     1. styles/Light.qss must exist                                      │
//! │     2. settings.theme = "Light" (persisted)                             │
//! │     3. reload + re-apply to all targets                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use teis_db::Database;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult, ErrorCode};

/// Settings key holding the theme name.
pub const THEME_SETTING: &str = "theme";

/// Theme used when the setting is missing.
pub const DEFAULT_THEME: &str = "Dark";

const STYLESHEET_EXT: &str = "qss";

/// Anything that can display a stylesheet.
pub trait ThemeTarget: Send {
    /// Identifies the target; registering the same id twice is a no-op.
    fn id(&self) -> &str;

    fn apply_stylesheet(&mut self, theme: &str, stylesheet: &str);
}

/// Current theme and the views that follow it.
pub struct ThemeManager {
    styles_dir: PathBuf,
    current: String,
    targets: Vec<Box<dyn ThemeTarget>>,
}

impl std::fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeManager")
            .field("styles_dir", &self.styles_dir)
            .field("current", &self.current)
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl ThemeManager {
    /// Reads the current theme from settings.
    pub async fn load(db: &Database, styles_dir: impl Into<PathBuf>) -> ApiResult<Self> {
        let current = db
            .settings()
            .get(THEME_SETTING)
            .await?
            .unwrap_or_else(|| DEFAULT_THEME.to_string());

        debug!(theme = %current, "Theme loaded");
        Ok(ThemeManager {
            styles_dir: styles_dir.into(),
            current,
            targets: Vec::new(),
        })
    }

    pub fn current_theme(&self) -> &str {
        &self.current
    }

    pub fn styles_dir(&self) -> &Path {
        &self.styles_dir
    }

    /// Number of registered targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Names of the stylesheets in the styles directory, sorted.
    ///
    /// A missing directory yields an empty list.
    pub fn available_themes(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.styles_dir) else {
            return Vec::new();
        };

        let mut themes: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == STYLESHEET_EXT))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        themes.sort();
        themes
    }

    /// Contents of the current theme's stylesheet.
    pub fn stylesheet(&self) -> ApiResult<String> {
        self.read_stylesheet(&self.current)
    }

    /// Applies the current stylesheet to `target` and keeps it registered.
    pub fn register(&mut self, mut target: Box<dyn ThemeTarget>) -> ApiResult<()> {
        if self.targets.iter().any(|t| t.id() == target.id()) {
            return Ok(());
        }

        let stylesheet = self.stylesheet()?;
        target.apply_stylesheet(&self.current, &stylesheet);
        debug!(target = %target.id(), theme = %self.current, "Theme target registered");
        self.targets.push(target);
        Ok(())
    }

    /// Persists `theme` and re-applies it to every registered target.
    pub async fn change_theme(&mut self, db: &Database, theme: &str) -> ApiResult<()> {
        let theme = theme.trim();
        let stylesheet = self.read_stylesheet(theme)?;

        db.settings().set(THEME_SETTING, theme).await?;
        self.current = theme.to_string();

        for target in &mut self.targets {
            target.apply_stylesheet(&self.current, &stylesheet);
        }

        info!(theme = %self.current, targets = self.targets.len(), "Theme changed");
        Ok(())
    }

    fn read_stylesheet(&self, theme: &str) -> ApiResult<String> {
        if theme.is_empty() || theme.contains(['/', '\\']) {
            return Err(ApiError::validation(format!("invalid theme name: '{theme}'")));
        }

        let path = self
            .styles_dir
            .join(format!("{theme}.{STYLESHEET_EXT}"));
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ApiError::new(
                ErrorCode::NotFound,
                format!("Theme not found: {theme} ({})", path.display()),
            ),
            _ => ApiError::internal(format!("reading {}: {e}", path.display())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use teis_db::DbConfig;

    /// Records every stylesheet it receives.
    struct Recorder {
        id: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl ThemeTarget for Recorder {
        fn id(&self) -> &str {
            &self.id
        }

        fn apply_stylesheet(&mut self, theme: &str, _stylesheet: &str) {
            self.seen.lock().unwrap().push(theme.to_string());
        }
    }

    fn styles_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dark.qss"), "QWidget { background: #222; }").unwrap();
        std::fs::write(dir.path().join("Light.qss"), "QWidget { background: #eee; }").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_defaults_to_dark_and_lists_themes() {
        let styles = styles_dir();
        let manager = ThemeManager::load(&db().await, styles.path()).await.unwrap();

        assert_eq!(manager.current_theme(), DEFAULT_THEME);
        assert_eq!(manager.available_themes(), vec!["Dark", "Light"]);
        assert!(manager.stylesheet().unwrap().contains("#222"));
    }

    #[tokio::test]
    async fn test_change_theme_reapplies_and_persists() {
        let styles = styles_dir();
        let db = db().await;
        let mut manager = ThemeManager::load(&db, styles.path()).await.unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        for id in ["main", "main", "about"] {
            manager
                .register(Box::new(Recorder {
                    id: id.to_string(),
                    seen: Arc::clone(&seen),
                }))
                .unwrap();
        }
        assert_eq!(manager.target_count(), 2);

        manager.change_theme(&db, "Light").await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Dark", "Dark", "Light", "Light"]
        );
        assert_eq!(
            db.settings().get(THEME_SETTING).await.unwrap().as_deref(),
            Some("Light")
        );

        let reloaded = ThemeManager::load(&db, styles.path()).await.unwrap();
        assert_eq!(reloaded.current_theme(), "Light");
    }

    #[tokio::test]
    async fn test_unknown_theme_is_rejected_without_saving() {
        let styles = styles_dir();
        let db = db().await;
        let mut manager = ThemeManager::load(&db, styles.path()).await.unwrap();

        let err = manager.change_theme(&db, "Neon").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(manager.current_theme(), "Dark");

        let err = manager.change_theme(&db, "../Dark").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_missing_styles_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ThemeManager::load(&db().await, dir.path().join("none"))
            .await
            .unwrap();
        assert!(manager.available_themes().is_empty());
    }
}
