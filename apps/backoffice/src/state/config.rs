//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TEIS_*`)
//! 2. Defaults (this file), with the data directory taken from the
//!    platform conventions
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Serialize;
use teis_core::{TaxRate, VAT_RATE};
use teis_reports::CompanyInfo;
use tracing::warn;

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "teis.db";

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Root for reports/, exports/ and backups/.
    pub data_dir: PathBuf,

    /// SQLite database file.
    pub db_path: PathBuf,

    /// Directory holding the `*.qss` stylesheets.
    pub styles_dir: PathBuf,

    /// Business details printed in report headers.
    pub company: CompanyInfo,

    /// IVA in basis points (2100 = 21%).
    pub vat_rate_bps: u32,

    /// Currency symbol used on invoice reports.
    pub currency_symbol: String,
}

impl Default for ConfigState {
    /// Returns the defaults:
    ///
    /// - Data directory: platform data dir (`~/.local/share/teis-pos` on
    ///   Linux), `./teis-data` when it cannot be determined
    /// - Database: `<data_dir>/teis.db`
    /// - Styles: `./styles`
    /// - Company: Empresa Teis, Vigo
    /// - IVA: 21%, currency €
    fn default() -> Self {
        let data_dir = ProjectDirs::from("com", "teis", "pos")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("teis-data"));

        ConfigState::with_data_dir(data_dir)
    }
}

impl ConfigState {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        ConfigState {
            db_path: data_dir.join(DB_FILE_NAME),
            data_dir,
            styles_dir: PathBuf::from("styles"),
            company: CompanyInfo::default(),
            vat_rate_bps: VAT_RATE.bps(),
            currency_symbol: "€".to_string(),
        }
    }

    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TEIS_DATA_DIR`: root of reports/, exports/, backups/
    /// - `TEIS_DB_PATH`: database file (default `<data_dir>/teis.db`)
    /// - `TEIS_STYLES_DIR`: stylesheet directory
    /// - `TEIS_COMPANY_NAME`, `TEIS_COMPANY_CIF`, `TEIS_COMPANY_ADDRESS`,
    ///   `TEIS_COMPANY_CITY`, `TEIS_COMPANY_PHONE`, `TEIS_COMPANY_EMAIL`
    /// - `TEIS_VAT_RATE`: IVA percentage (e.g. "21" or "10.5")
    /// - `TEIS_CURRENCY`: currency symbol for invoices
    pub fn from_env() -> Self {
        ConfigState::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("TEIS_DATA_DIR") {
            Some(dir) => ConfigState::with_data_dir(dir),
            None => ConfigState::default(),
        };

        if let Some(path) = lookup("TEIS_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("TEIS_STYLES_DIR") {
            config.styles_dir = PathBuf::from(dir);
        }

        let company = &mut config.company;
        for (key, field) in [
            ("TEIS_COMPANY_NAME", &mut company.name),
            ("TEIS_COMPANY_CIF", &mut company.cif),
            ("TEIS_COMPANY_ADDRESS", &mut company.address),
            ("TEIS_COMPANY_CITY", &mut company.city),
            ("TEIS_COMPANY_PHONE", &mut company.phone),
            ("TEIS_COMPANY_EMAIL", &mut company.email),
        ] {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(rate) = lookup("TEIS_VAT_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if (0.0..=100.0).contains(&pct) => {
                    config.vat_rate_bps = TaxRate::from_percentage(pct).bps();
                }
                _ => warn!(value = %rate, "Ignoring invalid TEIS_VAT_RATE"),
            }
        }

        if let Some(symbol) = lookup("TEIS_CURRENCY") {
            config.currency_symbol = symbol;
        }

        config
    }

    /// IVA applied to invoices.
    pub fn vat_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.vat_rate_bps)
    }

    /// Where PDF reports are written.
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    /// Where CSV exports are written.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    /// Where backups are written.
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }
}
