//! # Invoice Report
//!
//! One invoice: customer block in the header, a row per sale line and a
//! subtotal / IVA / total block after the last line.

use chrono::NaiveDateTime;
use teis_core::{Customer, Invoice, InvoiceTotals, SaleLine, TaxRate};

use crate::layout::{
    truncate_to, Column, CompanyInfo, DrawOp, FontStyle, Paginator, ReportLayout,
};

const COLUMNS: &[Column] = &[
    Column { title: "CODE", title_x: 45.0, cell_x: 48.0 },
    Column { title: "PRODUCT", title_x: 105.0, cell_x: 105.0 },
    Column { title: "UNIT PRICE", title_x: 300.0, cell_x: 300.0 },
    Column { title: "QUANTITY", title_x: 385.0, cell_x: 395.0 },
    Column { title: "TOTAL", title_x: 465.0, cell_x: 465.0 },
];

const MAX_PRODUCT_CHARS: usize = 35;

/// Everything printed on an invoice.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceReport<'a> {
    pub invoice: &'a Invoice,
    pub customer: &'a Customer,
    pub lines: &'a [SaleLine],
    pub rate: TaxRate,
    /// Currency symbol appended to amounts.
    pub currency: &'a str,
}

impl InvoiceReport<'_> {
    /// Report title, also used for the output file name.
    pub fn title(&self) -> String {
        format!("Invoice Nº {}", self.invoice.id)
    }
}

/// Lays out an invoice.
pub fn invoice_report_layout(
    report: &InvoiceReport<'_>,
    company: &CompanyInfo,
    generated_at: NaiveDateTime,
) -> ReportLayout {
    let title = report.title();
    let mut paginator = Paginator::new(
        &title,
        company,
        COLUMNS,
        generated_at,
        customer_block(report),
    );

    for line in report.lines {
        paginator.row(vec![
            line.product_code.to_string(),
            truncate_to(&line.product_name, MAX_PRODUCT_CHARS),
            line.unit_price.format_with(report.currency),
            line.quantity.to_string(),
            line.line_total.format_with(report.currency),
        ]);
    }

    let totals = InvoiceTotals::from_sale_lines(report.lines, report.rate);
    let rows = [
        ("Subtotal:".to_string(), totals.subtotal),
        (tax_label(report.rate), totals.tax),
        ("Total:".to_string(), totals.total),
    ];

    paginator.ensure_room(rows.len());
    paginator.rule(300.0, 525.0);
    for (label, amount) in rows {
        paginator.cells(
            &[(385.0, label), (465.0, amount.format_with(report.currency))],
            FontStyle::Bold,
        );
    }

    let pages = paginator.finish();
    ReportLayout { title, pages }
}

/// `IVA (21%):`, or `IVA (10.5%):` for fractional rates.
fn tax_label(rate: TaxRate) -> String {
    let bps = rate.bps();
    if bps % 100 == 0 {
        format!("IVA ({}%):", bps / 100)
    } else {
        format!("IVA ({}%):", rate.percentage())
    }
}

fn customer_block(report: &InvoiceReport<'_>) -> Vec<DrawOp> {
    let customer = report.customer;
    let lines = [
        format!("Customer: {}", truncate_to(&customer.full_name(), 40)),
        format!("DNI/NIE: {}", customer.dni_nie),
        format!("Address: {}", truncate_to(&customer.full_address(), 40)),
        format!("Date: {}", report.invoice.issued_on.format("%d/%m/%Y")),
    ];

    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| DrawOp::Text {
            x: 300.0,
            y: 780.0 - 12.0 * i as f32,
            size: 9.0,
            style: FontStyle::Regular,
            text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use teis_core::{InvoiceType, Money, VAT_RATE};

    fn customer() -> Customer {
        Customer {
            dni_nie: "12345678Z".to_string(),
            registered_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            surname: "Otero".to_string(),
            name: "Marta".to_string(),
            email: "marta@mail.com".to_string(),
            mobile: "612345678".to_string(),
            address: "Rúa 1".to_string(),
            province: "Pontevedra".to_string(),
            city: "Vigo".to_string(),
            invoice_type: InvoiceType::Paper,
            is_active: true,
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            id: 7,
            dni_nie: "12345678Z".to_string(),
            issued_on: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    fn sale(id: i64, name: &str, cents: i64, qty: i64) -> SaleLine {
        SaleLine {
            id,
            invoice_id: 7,
            product_code: id,
            product_name: name.to_string(),
            quantity: qty,
            unit_price: Money::from_cents(cents),
            line_total: Money::from_cents(cents * qty),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_invoice_totals_block() {
        let lines = [sale(1, "Aceite", 1000, 2), sale(2, "Pan", 550, 1)];
        let customer = customer();
        let invoice = invoice();
        let report = InvoiceReport {
            invoice: &invoice,
            customer: &customer,
            lines: &lines,
            rate: VAT_RATE,
            currency: "€",
        };

        let layout = invoice_report_layout(&report, &CompanyInfo::default(), now());
        assert_eq!(layout.title, "Invoice Nº 7");
        assert_eq!(layout.pages.len(), 1);

        let page = &layout.pages[0];
        assert!(page.has_text("Customer: Marta Otero"));
        assert!(page.has_text("Date: 14/03/2025"));
        assert!(page.has_text("20.00 €"));
        assert!(page.has_text("IVA (21%):"));
        assert!(page.has_text("25.50 €"));
        assert!(page.has_text("5.36 €"));
        assert!(page.has_text("30.86 €"));
    }

    #[test]
    fn test_long_invoice_repeats_customer_block() {
        let lines: Vec<SaleLine> = (1..=30).map(|i| sale(i, "Pan", 100, 1)).collect();
        let customer = customer();
        let invoice = invoice();
        let report = InvoiceReport {
            invoice: &invoice,
            customer: &customer,
            lines: &lines,
            rate: VAT_RATE,
            currency: "€",
        };

        let layout = invoice_report_layout(&report, &CompanyInfo::default(), now());
        assert_eq!(layout.pages.len(), 2);
        assert!(layout.pages[1].has_text("DNI/NIE: 12345678Z"));
        assert!(layout.pages[1].has_text("Total:"));
        assert!(!layout.pages[0].has_text("Total:"));
    }

    #[test]
    fn test_tax_label() {
        assert_eq!(tax_label(TaxRate::from_bps(2100)), "IVA (21%):");
        assert_eq!(tax_label(TaxRate::from_bps(1050)), "IVA (10.5%):");
    }
}
