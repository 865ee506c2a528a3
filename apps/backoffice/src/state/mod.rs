//! # State Module
//!
//! Application state shared by the commands.
//!
//! Instead of a single `AppState` struct containing everything, each
//! concern gets its own state type and commands take only what they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │        ┌──────────────┐ ┌──────────────┐ ┌──────────────┐             │
//! │        │   DbState    │ │ ConfigState  │ │ ThemeManager │             │
//! │        │              │ │              │ │              │             │
//! │        │  RwLock<     │ │  data dirs   │ │  current     │             │
//! │        │   Database>  │ │  company     │ │  targets     │             │
//! │        │  DbConfig    │ │  IVA rate    │ │  styles dir  │             │
//! │        └──────────────┘ └──────────────┘ └──────────────┘             │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: pool is thread-safe; write lock only during restore        │
//! │  • ConfigState: Read-only after initialization                         │
//! │  • ThemeManager: owned by the caller, mutated through &mut             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod theme;

pub use config::{ConfigState, DB_FILE_NAME};
pub use db::DbState;
pub use theme::{ThemeManager, ThemeTarget, DEFAULT_THEME, THEME_SETTING};
