//! # Teis Back Office Library
//!
//! Record managers, invoicing, reports and backups for the Teis POS back
//! office. `main.rs` parses the command line and hands it to [`run`].
//!
//! ## Module Organization
//! ```text
//! teis_backoffice/
//! ├── lib.rs          ◄─── You are here (startup & shutdown)
//! ├── cli.rs          ◄─── clap definitions and dispatch
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database handle, locked during restore
//! │   ├── theme.rs    ◄─── Stylesheet manager
//! │   └── config.rs   ◄─── Directories, company, IVA, currency
//! ├── commands/
//! │   ├── customer.rs ◄─── Customer record manager
//! │   ├── product.rs  ◄─── Product record manager
//! │   ├── invoice.rs  ◄─── Invoices, drafts, sales
//! │   ├── report.rs   ◄─── PDF reports, CSV export
//! │   ├── backup.rs   ◄─── Backup & restore
//! │   ├── settings.rs ◄─── Settings & themes
//! │   └── location.rs ◄─── Provinces & cities
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │        ┌──────────────┐ ┌──────────────┐ ┌──────────────┐             │
//! │        │   DbState    │ │ ThemeManager │ │ ConfigState  │             │
//! │        │              │ │              │ │              │             │
//! │        │ • Pool       │ │ • Current    │ │ • Data dir   │             │
//! │        │ • Restore    │ │ • Targets    │ │ • Company    │             │
//! │        └──────────────┘ └──────────────┘ └──────────────┘             │
//! │                                                                         │
//! │  Each command takes only the state it needs.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Context};
use error::ApiResult;
use state::{ConfigState, DbState, ThemeManager, ThemeTarget};
use teis_db::DbConfig;

/// Runs one command line invocation.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber on stderr, RUST_LOG overrides                  │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • TEIS_* environment, then --db                                     │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations (reference data, dummy customer)           │
/// │                                                                         │
/// │  4. Initialize State Objects ─────────────────────────────────────────► │
/// │     • DbState, ThemeManager                                             │
/// │                                                                         │
/// │  5. Dispatch, then close the pool                                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> ExitCode {
    init_tracing();

    let json = cli.json;
    match run_inner(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, message = %e.message, "Command failed");
            if json {
                match serde_json::to_string_pretty(&e) {
                    Ok(text) => println!("{text}"),
                    Err(_) => eprintln!("{e}"),
                }
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_inner(cli: Cli) -> ApiResult<()> {
    let mut config = ConfigState::from_env();
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    info!(db_path = %config.db_path.display(), "Starting Teis back office");

    let db = DbState::open(DbConfig::new(&config.db_path)).await?;
    let mut themes = ThemeManager::load(&db.get().await, &config.styles_dir).await?;
    if let Err(e) = themes.register(Box::new(LogTarget)) {
        warn!(error = %e, "Stylesheet not applied");
    }

    let result = cli::dispatch(
        cli.command,
        Context {
            db: &db,
            config: &config,
            themes: &mut themes,
            json: cli.json,
        },
    )
    .await;

    db.close().await;
    result
}

/// Stand-in view for the command line: reports which stylesheet is active.
struct LogTarget;

impl ThemeTarget for LogTarget {
    fn id(&self) -> &str {
        "console"
    }

    fn apply_stylesheet(&mut self, theme: &str, stylesheet: &str) {
        info!(theme = %theme, bytes = stylesheet.len(), "Stylesheet applied");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=teis=trace` - Show trace for teis crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,teis=debug,sqlx=warn"));

    // stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

