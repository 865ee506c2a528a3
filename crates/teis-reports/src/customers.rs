//! # Customer Report
//!
//! One row per customer, active and inactive alike.

use chrono::NaiveDateTime;
use teis_core::Customer;

use crate::layout::{mask_dni, truncate_cell, Column, CompanyInfo, Paginator, ReportLayout};

/// Report title, also used in the footer.
pub const CUSTOMER_REPORT_TITLE: &str = "Customers";

const COLUMNS: &[Column] = &[
    Column { title: "DNI_NIE", title_x: 45.0, cell_x: 48.0 },
    Column { title: "SURNAME", title_x: 105.0, cell_x: 105.0 },
    Column { title: "NAME", title_x: 185.0, cell_x: 185.0 },
    Column { title: "MOBILE", title_x: 245.0, cell_x: 245.0 },
    Column { title: "CITY", title_x: 325.0, cell_x: 325.0 },
    Column { title: "INVOICE_TYPE", title_x: 380.0, cell_x: 405.0 },
    Column { title: "STATE", title_x: 480.0, cell_x: 485.0 },
];

/// Lays out the customer report.
pub fn customer_report_layout(
    customers: &[Customer],
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportLayout {
    let mut paginator = Paginator::new(
        CUSTOMER_REPORT_TITLE,
        company,
        COLUMNS,
        generated_at,
        Vec::new(),
    );

    for customer in customers {
        paginator.row(vec![
            mask_dni(&customer.dni_nie),
            truncate_cell(&customer.surname),
            truncate_cell(&customer.name),
            truncate_cell(&customer.mobile),
            truncate_cell(&customer.city),
            truncate_cell(customer.invoice_type.as_str()),
            customer.status_label().to_string(),
        ]);
    }

    ReportLayout {
        title: CUSTOMER_REPORT_TITLE.to_string(),
        pages: paginator.finish(),
    }
}
