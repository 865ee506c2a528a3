//! # Teis Back Office Entry Point
//!
//! ```text
//! teis ──► Cli::parse ──► teis_backoffice::run ──► commands/ ──► SQLite
//!                                                      │
//!                                                      └──► reports/, exports/, backups/
//! ```

use std::process::ExitCode;

use clap::Parser;
use teis_backoffice::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    teis_backoffice::run(cli).await
}
