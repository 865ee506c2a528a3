//! # Product Report
//!
//! Product catalogue listing, optionally narrowed to low stock or to one
//! family.

use chrono::NaiveDateTime;
use teis_core::Product;

use crate::layout::{truncate_cell, Column, CompanyInfo, Paginator, ReportLayout};

/// Report title, also used in the footer.
pub const PRODUCT_REPORT_TITLE: &str = "Products";

/// Stock level below which a product counts as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

const COLUMNS: &[Column] = &[
    Column { title: "CODE", title_x: 45.0, cell_x: 50.0 },
    Column { title: "NAME", title_x: 110.0, cell_x: 110.0 },
    Column { title: "FAMILY", title_x: 260.0, cell_x: 260.0 },
    Column { title: "STOCK", title_x: 360.0, cell_x: 370.0 },
    Column { title: "UNIT_PRICE", title_x: 430.0, cell_x: 435.0 },
];

/// Which products end up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSelection<'a> {
    All,
    /// Products with stock strictly below the threshold.
    LowStock(i64),
    Family(&'a str),
}

impl ProductSelection<'_> {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            ProductSelection::All => true,
            ProductSelection::LowStock(threshold) => product.stock < *threshold,
            ProductSelection::Family(family) => product.family.eq_ignore_ascii_case(family),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ProductSelection::All => PRODUCT_REPORT_TITLE.to_string(),
            ProductSelection::LowStock(threshold) => {
                format!("{PRODUCT_REPORT_TITLE} - stock below {threshold}")
            }
            ProductSelection::Family(family) => format!("{PRODUCT_REPORT_TITLE} - {family}"),
        }
    }

    /// Name used for the generated file.
    pub fn file_stem(&self) -> String {
        match self {
            ProductSelection::All => "products".to_string(),
            ProductSelection::LowStock(_) => "products_low_stock".to_string(),
            ProductSelection::Family(family) => format!("products_{}", family.to_lowercase()),
        }
    }
}

/// Lays out the product report for the products `selection` keeps.
pub fn product_report_layout(
    products: &[Product],
    selection: ProductSelection<'_>,
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportLayout {
    let title = selection.title();
    let mut paginator = Paginator::new(&title, company, COLUMNS, generated_at, Vec::new());

    for product in products.iter().filter(|p| selection.matches(p)) {
        paginator.row(vec![
            product.code.to_string(),
            truncate_cell(&product.name),
            truncate_cell(&product.family),
            product.stock.to_string(),
            product.unit_price.format_with(&product.currency),
        ]);
    }

    let pages = paginator.finish();
    ReportLayout { title, pages }
}
