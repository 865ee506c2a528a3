//! # teis-reports: PDF Reports and CSV Export for Teis POS
//!
//! Turns rows loaded by the caller into files. Never touches the database.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Report Pipeline                                │
//! │                                                                         │
//! │  &[Customer] ──► customers::customer_report_layout ─┐                  │
//! │                                                     ├─► ReportLayout   │
//! │  &[Product]  ──► products::product_report_layout ───┤                  │
//! │  InvoiceReport ──► invoice::invoice_report_layout ──┘   (pure pages)   │
//! │                                                             │           │
//! │                                            pdf::render_pdf ▼           │
//! │                     <reports_dir>/2025_03_01_10_30_00_customers.pdf   │
//! │                                                                         │
//! │  &[Customer] ──► export::write_customers_csv                            │
//! │                     <export_dir>/2025_03_01_10_30_00_customers.csv    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`layout`] - Page geometry, draw operations and the paginator
//! - [`customers`] - Customer list report
//! - [`products`] - Product list, low stock and per-family reports
//! - [`invoice`] - Single invoice report
//! - [`pdf`] - printpdf renderer
//! - [`export`] - Customer CSV export
//! - [`error`] - Report error types

pub mod customers;
pub mod error;
pub mod export;
pub mod invoice;
pub mod layout;
pub mod pdf;
pub mod products;

pub use customers::{customer_report_layout, CUSTOMER_REPORT_TITLE};
pub use error::{ReportError, ReportResult};
pub use export::{export_customers_csv, write_customers_csv, CUSTOMER_CSV_HEADER};
pub use invoice::{invoice_report_layout, InvoiceReport};
pub use layout::{CompanyInfo, Page, ReportLayout};
pub use pdf::{render_pdf, write_pdf};
pub use products::{
    product_report_layout, ProductSelection, DEFAULT_LOW_STOCK_THRESHOLD, PRODUCT_REPORT_TITLE,
};

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use teis_core::{Customer, Product};

/// `YYYY_MM_DD_HH_MM_SS_<name>.<ext>`, with spaces in `name` replaced.
pub fn report_file_name(generated_at: NaiveDateTime, name: &str, ext: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}_{}.{}", generated_at.format("%Y_%m_%d_%H_%M_%S"), name, ext)
}

/// Writes the customer report PDF into `dir`, creating it if needed.
pub fn write_customer_report(
    dir: &Path,
    customers: &[Customer],
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let layout = customer_report_layout(customers, company, generated_at);
    let path = dir.join(report_file_name(generated_at, "customers", "pdf"));
    write_pdf(&layout, &path)?;
    Ok(path)
}

/// Writes the product report PDF for `selection` into `dir`.
pub fn write_product_report(
    dir: &Path,
    products: &[Product],
    selection: ProductSelection<'_>,
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let layout = product_report_layout(products, selection, company, generated_at);
    let path = dir.join(report_file_name(generated_at, &selection.file_stem(), "pdf"));
    write_pdf(&layout, &path)?;
    Ok(path)
}

/// Writes one invoice PDF into `dir`, creating it if needed.
pub fn write_invoice_report(
    dir: &Path,
    report: &InvoiceReport<'_>,
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let layout = invoice_report_layout(report, company, generated_at);
    let name = format!("invoice_{}", report.invoice.id);
    let path = dir.join(report_file_name(generated_at, &name, "pdf"));
    write_pdf(&layout, &path)?;
    Ok(path)
}

/// Writes the customers CSV into `dir`, creating it if needed.
pub fn write_customer_export(
    dir: &Path,
    customers: &[Customer],
    generated_at: NaiveDateTime,
) -> ReportResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(generated_at, "customers", "csv"));
    export_customers_csv(customers, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(stamp(), "customers", "pdf"),
            "2025_03_01_10_30_05_customers.pdf"
        );
        assert_eq!(
            report_file_name(stamp(), "invoice 7", "pdf"),
            "2025_03_01_10_30_05_invoice_7.pdf"
        );
    }

    #[test]
    fn test_writers_create_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        let exports = dir.path().join("exports");

        let pdf = write_customer_report(&reports, &[], &CompanyInfo::default(), stamp()).unwrap();
        let csv = write_customer_export(&exports, &[], stamp()).unwrap();
        let low = write_product_report(
            &reports,
            &[],
            ProductSelection::LowStock(DEFAULT_LOW_STOCK_THRESHOLD),
            &CompanyInfo::default(),
            stamp(),
        )
        .unwrap();

        assert!(pdf.exists());
        assert!(csv.exists());
        assert!(low.ends_with("2025_03_01_10_30_05_products_low_stock.pdf"));
        assert_eq!(
            pdf.file_name().unwrap().to_str().unwrap(),
            "2025_03_01_10_30_05_customers.pdf"
        );
    }
}
