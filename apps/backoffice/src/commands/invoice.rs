//! # Invoice Commands
//!
//! Invoice headers, the line draft, and saving lines as sales.
//!
//! Editing a draft line by line is `InvoiceDraft`'s job in `teis-core`;
//! these commands build a draft from typed lines and store it.
//!
//! ## Invoice Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. invoice_header(dni)      customer block (dummy if unknown)          │
//! │  2. create_invoice(dni?)     header row, issued today                   │
//! │  3. build_draft(lines)       InvoiceDraft from (name, qty) pairs        │
//! │     preview(draft)           lines + totals, nothing stored             │
//! │  4. issue_invoice(dni?, d)   header + lines (one transaction)           │
//! │     save_sales(id, draft)    more lines on an existing invoice          │
//! │  5. invoice_detail(id)       header + customer + lines + totals         │
//! │                                                                         │
//! │  delete_invoice(id) removes header and lines in one transaction         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Local;
use serde::Serialize;
use teis_core::validation::{validate_dni_nie, validate_product_name};
use teis_core::{
    CoreError, Customer, Invoice, InvoiceDraft, InvoiceTotals, LineDraft, SaleLine,
    DUMMY_CUSTOMER_DNI,
};
use teis_db::Database;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState};

/// The draft as shown to the operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDto {
    pub lines: Vec<DraftLineDto>,
    pub totals: InvoiceTotals,
}

/// One draft line with its computed total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineDto {
    pub product_code: i64,
    pub product_name: String,
    pub unit_price: teis_core::Money,
    pub quantity: i64,
    pub line_total: teis_core::Money,
}

impl From<&LineDraft> for DraftLineDto {
    fn from(line: &LineDraft) -> Self {
        DraftLineDto {
            product_code: line.product_code,
            product_name: line.product_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

impl DraftDto {
    fn new(draft: &InvoiceDraft, config: &ConfigState) -> Self {
        DraftDto {
            lines: draft.lines().iter().map(DraftLineDto::from).collect(),
            totals: draft.totals(config.vat_rate()),
        }
    }
}

/// A stored invoice with everything needed to display or print it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub customer: Customer,
    pub lines: Vec<SaleLine>,
    pub totals: InvoiceTotals,
}

// =============================================================================
// Headers
// =============================================================================

/// Lists invoice headers, newest first.
pub async fn list_invoices(db: &DbState) -> ApiResult<Vec<Invoice>> {
    debug!("list_invoices command");
    Ok(db.get().await.invoices().list().await?)
}

/// Customer shown in an invoice header.
///
/// Unknown or malformed national IDs resolve to the generic customer.
pub async fn invoice_header(db: &DbState, dni_nie: &str) -> ApiResult<Customer> {
    let dni = dni_nie.trim().to_uppercase();
    debug!(dni_nie = %dni, "invoice_header command");
    resolve_customer(&db.get().await, &dni).await
}

async fn resolve_customer(db: &Database, dni: &str) -> ApiResult<Customer> {
    if !dni.is_empty() {
        if let Some(customer) = db.customers().get(dni).await? {
            return Ok(customer);
        }
    }

    db.customers()
        .get(DUMMY_CUSTOMER_DNI)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", DUMMY_CUSTOMER_DNI))
}

/// Creates an invoice dated today.
///
/// No national ID, or a blank one, bills the generic customer. A given
/// ID must be well formed but need not be registered.
pub async fn create_invoice(db: &DbState, dni_nie: Option<&str>) -> ApiResult<Invoice> {
    let dni = invoice_dni(dni_nie)?;
    debug!(dni_nie = %dni, "create_invoice command");

    let invoice = db
        .get()
        .await
        .invoices()
        .create(&dni, Local::now().date_naive())
        .await?;

    info!(id = invoice.id, dni_nie = %invoice.dni_nie, "Invoice created");
    Ok(invoice)
}

fn invoice_dni(dni_nie: Option<&str>) -> ApiResult<String> {
    match dni_nie.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dni) => Ok(validate_dni_nie(dni)?),
        None => Ok(DUMMY_CUSTOMER_DNI.to_string()),
    }
}

/// Header, customer, lines and totals of invoice `id`.
pub async fn invoice_detail(
    db: &DbState,
    config: &ConfigState,
    id: i64,
) -> ApiResult<InvoiceDetail> {
    debug!(id, "invoice_detail command");
    let database = db.get().await;

    let invoice = database
        .invoices()
        .get(id)
        .await?
        .ok_or(CoreError::InvoiceNotFound(id))?;
    let customer = resolve_customer(&database, &invoice.dni_nie).await?;
    let lines = database.invoices().lines(id).await?;
    let totals = InvoiceTotals::from_sale_lines(&lines, config.vat_rate());

    Ok(InvoiceDetail {
        invoice,
        customer,
        lines,
        totals,
    })
}

/// Deletes an invoice and its lines atomically. Returns the lines removed.
pub async fn delete_invoice(db: &DbState, id: i64) -> ApiResult<u64> {
    debug!(id, "delete_invoice command");
    let lines = db.get().await.invoices().delete(id).await?;
    info!(id, lines, "Invoice deleted");
    Ok(lines)
}

// =============================================================================
// Draft
// =============================================================================

/// Builds a draft from `(product name, quantity)` pairs.
pub async fn build_draft(db: &DbState, lines: &[(String, i64)]) -> ApiResult<InvoiceDraft> {
    debug!(count = lines.len(), "build_draft command");
    let database = db.get().await;

    let mut draft = InvoiceDraft::new();
    for (name, quantity) in lines {
        let name = validate_product_name(name)?;
        let product = database
            .products()
            .get_by_name(&name)
            .await?
            .ok_or(CoreError::ProductNotFound(name))?;
        draft.add_line(&product, *quantity)?;
    }
    Ok(draft)
}

/// Lines and totals of a draft, without saving anything.
pub fn preview(draft: &InvoiceDraft, config: &ConfigState) -> DraftDto {
    DraftDto::new(draft, config)
}

// =============================================================================
// Sales
// =============================================================================

/// Creates an invoice dated today together with the draft's lines.
///
/// Header and lines are written in one transaction, so a failing line
/// leaves no empty invoice behind. An empty draft creates a bare header.
pub async fn issue_invoice(
    db: &DbState,
    dni_nie: Option<&str>,
    draft: &InvoiceDraft,
) -> ApiResult<Invoice> {
    if draft.is_empty() {
        return create_invoice(db, dni_nie).await;
    }

    let dni = invoice_dni(dni_nie)?;
    debug!(dni_nie = %dni, lines = draft.len(), "issue_invoice command");

    let (invoice, saved) = db
        .get()
        .await
        .invoices()
        .create_with_lines(&dni, Local::now().date_naive(), draft.lines())
        .await?;

    info!(id = invoice.id, lines = saved.len(), "Invoice issued");
    Ok(invoice)
}

/// Stores the draft as further lines of the existing invoice `invoice_id`.
pub async fn save_sales(
    db: &DbState,
    invoice_id: i64,
    draft: &InvoiceDraft,
) -> ApiResult<Vec<SaleLine>> {
    debug!(invoice_id, lines = draft.len(), "save_sales command");

    if draft.is_empty() {
        return Err(CoreError::EmptyInvoice(invoice_id).into());
    }

    let saved = db
        .get()
        .await
        .invoices()
        .save_lines(invoice_id, draft.lines())
        .await?;

    info!(invoice_id, lines = saved.len(), "Sales saved");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::create_product;
    use crate::error::ErrorCode;
    use teis_core::{InvoiceType, Money, ProductForm};
    use teis_db::DbConfig;

    async fn state() -> DbState {
        DbState::open(DbConfig::in_memory()).await.unwrap()
    }

    fn config() -> ConfigState {
        ConfigState::with_data_dir("/tmp/teis-test")
    }

    async fn product(db: &DbState, name: &str, price: &str) {
        create_product(
            db,
            ProductForm {
                name: name.to_string(),
                stock: "10".to_string(),
                family: "Foods".to_string(),
                unit_price: price.to_string(),
                currency: "€".to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_header_falls_back_to_generic_customer() {
        let db = state().await;

        let customer = invoice_header(&db, "99999999R").await.unwrap();
        assert_eq!(customer.dni_nie, DUMMY_CUSTOMER_DNI);

        let customer = invoice_header(&db, "").await.unwrap();
        assert_eq!(customer.dni_nie, DUMMY_CUSTOMER_DNI);
    }

    #[tokio::test]
    async fn test_header_finds_registered_customer() {
        let db = state().await;
        db.get()
            .await
            .customers()
            .insert(&Customer {
                dni_nie: "12345678Z".to_string(),
                registered_on: Local::now().date_naive(),
                surname: "Otero".to_string(),
                name: "Marta".to_string(),
                email: "marta@mail.com".to_string(),
                mobile: "612345678".to_string(),
                address: "Rúa 1".to_string(),
                province: "Pontevedra".to_string(),
                city: "Vigo".to_string(),
                invoice_type: InvoiceType::Paper,
                is_active: true,
            })
            .await
            .unwrap();

        let customer = invoice_header(&db, " 12345678z").await.unwrap();
        assert_eq!(customer.full_name(), "Marta Otero");
    }

    #[tokio::test]
    async fn test_create_invoice_defaults_to_generic_customer() {
        let db = state().await;

        let invoice = create_invoice(&db, None).await.unwrap();
        assert_eq!(invoice.dni_nie, DUMMY_CUSTOMER_DNI);

        let invoice = create_invoice(&db, Some("  ")).await.unwrap();
        assert_eq!(invoice.dni_nie, DUMMY_CUSTOMER_DNI);

        let err = create_invoice(&db, Some("1234")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_full_invoice_flow() {
        let db = state().await;
        let config = config();
        product(&db, "Aceite", "10.00").await;
        product(&db, "Pan", "5.50").await;

        let mut draft = build_draft(&db, &[("Aceite".to_string(), 1), ("Aceite".to_string(), 1)])
            .await
            .unwrap();
        let pan = crate::commands::product::get_product(&db, "Pan").await.unwrap();
        draft.set_product(1, &pan).unwrap();
        draft.set_quantity(0, 2).unwrap();

        let view = preview(&draft, &config);
        assert_eq!(view.lines[0].line_total, Money::from_cents(2000));
        assert_eq!(view.totals.subtotal.cents(), 2550);
        assert_eq!(view.totals.tax.cents(), 536);
        assert_eq!(view.totals.total.cents(), 3086);

        let invoice = issue_invoice(&db, None, &draft).await.unwrap();

        let detail = invoice_detail(&db, &config, invoice.id).await.unwrap();
        assert_eq!(detail.customer.dni_nie, DUMMY_CUSTOMER_DNI);
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.totals.total.cents(), 3086);
    }

    #[tokio::test]
    async fn test_issue_invoice_with_failing_line_leaves_no_header() {
        let db = state().await;
        let draft: InvoiceDraft = [
            LineDraft {
                product_code: 1,
                product_name: "Pan".to_string(),
                unit_price: Money::from_cents(250),
                quantity: 1,
            },
            // rejected by the sales table
            LineDraft {
                product_code: 2,
                product_name: "Aceite".to_string(),
                unit_price: Money::from_cents(1000),
                quantity: 0,
            },
        ]
        .into_iter()
        .collect();

        assert!(issue_invoice(&db, Some("12345678Z"), &draft).await.is_err());
        assert!(list_invoices(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_empty_draft_creates_bare_header() {
        let db = state().await;
        let invoice = issue_invoice(&db, Some("12345678Z"), &InvoiceDraft::new())
            .await
            .unwrap();

        let detail = invoice_detail(&db, &config(), invoice.id).await.unwrap();
        assert!(detail.lines.is_empty());
        assert_eq!(detail.totals.total, Money::zero());
    }

    #[tokio::test]
    async fn test_sale_lines_keep_price_after_product_change() {
        let db = state().await;
        product(&db, "Pan", "2.50").await;

        let invoice = create_invoice(&db, None).await.unwrap();
        let draft = build_draft(&db, &[("Pan".to_string(), 2)]).await.unwrap();
        save_sales(&db, invoice.id, &draft).await.unwrap();

        let pan = crate::commands::product::get_product(&db, "Pan").await.unwrap();
        crate::commands::product::modify_product(
            &db,
            pan.code,
            ProductForm {
                name: "Pan".to_string(),
                stock: "10".to_string(),
                family: "Foods".to_string(),
                unit_price: "9.99".to_string(),
                currency: "€".to_string(),
            },
        )
        .await
        .unwrap();

        let detail = invoice_detail(&db, &config(), invoice.id).await.unwrap();
        assert_eq!(detail.lines[0].unit_price.cents(), 250);
        assert_eq!(detail.lines[0].line_total.cents(), 500);
    }

    #[tokio::test]
    async fn test_save_sales_failures() {
        let db = state().await;
        product(&db, "Pan", "2.50").await;

        let err = save_sales(&db, 1, &InvoiceDraft::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let draft = build_draft(&db, &[("Pan".to_string(), 1)]).await.unwrap();
        let err = save_sales(&db, 404, &draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_build_draft_rejects_unknown_product_and_bad_quantity() {
        let db = state().await;
        product(&db, "Pan", "2.50").await;

        let err = build_draft(&db, &[("Queso".to_string(), 1)]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = build_draft(&db, &[("Pan".to_string(), 1000)]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_invoice_removes_lines() {
        let db = state().await;
        product(&db, "Pan", "2.50").await;

        let draft = build_draft(&db, &[("Pan".to_string(), 3)]).await.unwrap();
        let invoice = issue_invoice(&db, None, &draft).await.unwrap();

        assert_eq!(delete_invoice(&db, invoice.id).await.unwrap(), 1);

        let err = invoice_detail(&db, &config(), invoice.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(db.get().await.invoices().lines(invoice.id).await.unwrap().is_empty());

        let err = delete_invoice(&db, invoice.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
