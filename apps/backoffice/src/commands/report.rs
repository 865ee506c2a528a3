//! # Report Commands
//!
//! Writes PDF reports and the customer CSV under the configured data
//! directory and returns the file path.

use std::path::PathBuf;

use chrono::Local;
use teis_reports::{
    write_customer_export, write_customer_report, write_invoice_report, write_product_report,
    InvoiceReport, ProductSelection,
};
use tracing::debug;

use crate::commands::invoice::invoice_detail;
use crate::commands::product::product_families;
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState};

/// PDF of every customer, active and inactive.
pub async fn customer_report(db: &DbState, config: &ConfigState) -> ApiResult<PathBuf> {
    debug!("customer_report command");
    let customers = db.get().await.customers().list(true).await?;

    Ok(write_customer_report(
        &config.reports_dir(),
        &customers,
        &config.company,
        Local::now().naive_local(),
    )?)
}

/// PDF of the product catalogue.
///
/// `low_stock` keeps products whose stock is below the threshold; `family`
/// keeps one family, which must have products. At most one may be given.
pub async fn product_report(
    db: &DbState,
    config: &ConfigState,
    low_stock: Option<i64>,
    family: Option<&str>,
) -> ApiResult<PathBuf> {
    debug!(?low_stock, ?family, "product_report command");

    let selection = match (low_stock, family) {
        (Some(_), Some(_)) => {
            return Err(ApiError::validation(
                "choose either a low stock threshold or a family",
            ))
        }
        (Some(threshold), None) if threshold <= 0 => {
            return Err(ApiError::validation("low stock threshold must be positive"))
        }
        (Some(threshold), None) => ProductSelection::LowStock(threshold),
        (None, Some(family)) => {
            let families = product_families(db).await?;
            let known = families.iter().find(|f| f.eq_ignore_ascii_case(family.trim()));
            match known {
                Some(_) => ProductSelection::Family(family.trim()),
                None => return Err(ApiError::not_found("Product family", family)),
            }
        }
        (None, None) => ProductSelection::All,
    };

    let products = db.get().await.products().list().await?;
    Ok(write_product_report(
        &config.reports_dir(),
        &products,
        selection,
        &config.company,
        Local::now().naive_local(),
    )?)
}

/// PDF of invoice `id`.
pub async fn invoice_report(db: &DbState, config: &ConfigState, id: i64) -> ApiResult<PathBuf> {
    debug!(id, "invoice_report command");
    let detail = invoice_detail(db, config, id).await?;

    let report = InvoiceReport {
        invoice: &detail.invoice,
        customer: &detail.customer,
        lines: &detail.lines,
        rate: config.vat_rate(),
        currency: &config.currency_symbol,
    };
    Ok(write_invoice_report(
        &config.reports_dir(),
        &report,
        &config.company,
        Local::now().naive_local(),
    )?)
}

/// CSV of every customer.
pub async fn export_customers(db: &DbState, config: &ConfigState) -> ApiResult<PathBuf> {
    debug!("export_customers command");
    let customers = db.get().await.customers().list(true).await?;

    Ok(write_customer_export(
        &config.exports_dir(),
        &customers,
        Local::now().naive_local(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::invoice::create_invoice;
    use crate::commands::product::create_product;
    use teis_core::ProductForm;
    use crate::error::ErrorCode;
    use teis_db::DbConfig;

    async fn setup() -> (DbState, ConfigState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState::with_data_dir(dir.path());
        let db = DbState::open(DbConfig::in_memory()).await.unwrap();
        (db, config, dir)
    }

    #[tokio::test]
    async fn test_customer_report_and_export_land_in_data_dir() {
        let (db, config, _dir) = setup().await;

        let pdf = customer_report(&db, &config).await.unwrap();
        assert!(pdf.starts_with(config.reports_dir()));
        assert!(pdf.to_string_lossy().ends_with("_customers.pdf"));
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));

        let csv = export_customers(&db, &config).await.unwrap();
        assert!(csv.starts_with(config.exports_dir()));
        let text = std::fs::read_to_string(csv).unwrap();
        // header + the generic customer
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_invoice_report() {
        let (db, config, _dir) = setup().await;
        let invoice = create_invoice(&db, None).await.unwrap();

        let pdf = invoice_report(&db, &config, invoice.id).await.unwrap();
        assert!(pdf
            .to_string_lossy()
            .ends_with(&format!("_invoice_{}.pdf", invoice.id)));

        let err = invoice_report(&db, &config, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_product_reports() {
        let (db, config, _dir) = setup().await;
        for (name, stock, family) in [("Pan", "4", "Foods"), ("Silla", "30", "Furniture")] {
            let form = ProductForm {
                name: name.to_string(),
                stock: stock.to_string(),
                family: family.to_string(),
                unit_price: "2.50".to_string(),
                currency: "€".to_string(),
            };
            create_product(&db, form).await.unwrap();
        }

        let all = product_report(&db, &config, None, None).await.unwrap();
        assert!(all.to_string_lossy().ends_with("_products.pdf"));
        assert!(std::fs::read(&all).unwrap().starts_with(b"%PDF"));

        let low = product_report(&db, &config, Some(10), None).await.unwrap();
        assert!(low.to_string_lossy().ends_with("_products_low_stock.pdf"));

        let foods = product_report(&db, &config, None, Some("foods")).await.unwrap();
        assert!(foods.to_string_lossy().ends_with("_products_foods.pdf"));

        let err = product_report(&db, &config, None, Some("Electronic"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = product_report(&db, &config, Some(10), Some("Foods"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
