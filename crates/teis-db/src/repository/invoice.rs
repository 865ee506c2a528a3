//! # Invoice Repository
//!
//! Database operations for invoice headers and their sale lines.
//!
//! ## Transactions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save_lines(id, lines)             delete(id)                           │
//! │  ─────────────────────             ──────────                           │
//! │  BEGIN                             BEGIN                                │
//! │  check invoice exists              DELETE FROM sales WHERE invoice_id   │
//! │  INSERT sale × N                   DELETE FROM invoices WHERE id        │
//! │  COMMIT                            COMMIT (or ROLLBACK if 0 rows)       │
//! │                                                                         │
//! │  create_with_lines(dni, date, lines)                                    │
//! │  ───────────────────────────────────                                    │
//! │  BEGIN, INSERT header, INSERT sale × N, COMMIT                          │
//! │                                                                         │
//! │  Either every line is stored or none is; a header never outlives or    │
//! │  loses its lines halfway through a delete.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teis_core::{Invoice, LineDraft, SaleLine};

const SALE_COLUMNS: &str =
    "id, invoice_id, product_code, product_name, quantity, unit_price, line_total";

fn tx_error(err: sqlx::Error) -> DbError {
    DbError::TransactionFailed(err.to_string())
}

/// Repository for invoices and sale lines.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Lists invoice headers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        debug!("Listing invoices");

        let invoices = sqlx::query_as::<_, Invoice>(
            "SELECT id, dni_nie, issued_on FROM invoices ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Gets an invoice header by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Invoice>> {
        debug!(id, "Getting invoice");

        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, dni_nie, issued_on FROM invoices WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Creates an invoice header.
    pub async fn create(&self, dni_nie: &str, issued_on: NaiveDate) -> DbResult<Invoice> {
        debug!(dni_nie = %dni_nie, issued_on = %issued_on, "Creating invoice");

        let result = sqlx::query("INSERT INTO invoices (dni_nie, issued_on) VALUES (?1, ?2)")
            .bind(dni_nie)
            .bind(issued_on)
            .execute(&self.pool)
            .await?;

        Ok(Invoice {
            id: result.last_insert_rowid(),
            dni_nie: dni_nie.to_string(),
            issued_on,
        })
    }

    /// Stores draft lines under `invoice_id` in one transaction.
    ///
    /// Returns the stored lines with their IDs and line totals.
    ///
    /// ## Errors
    /// * `NotFound` - the invoice does not exist (nothing is written)
    pub async fn save_lines(&self, invoice_id: i64, lines: &[LineDraft]) -> DbResult<Vec<SaleLine>> {
        debug!(invoice_id, count = lines.len(), "Saving sale lines");

        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM invoices WHERE id = ?1")
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        let saved = insert_lines(&mut *tx, invoice_id, lines).await?;

        tx.commit().await.map_err(tx_error)?;

        debug!(invoice_id, count = saved.len(), "Sale lines saved");
        Ok(saved)
    }

    /// Creates an invoice header together with its lines in one transaction.
    ///
    /// A failing line leaves no header behind.
    pub async fn create_with_lines(
        &self,
        dni_nie: &str,
        issued_on: NaiveDate,
        lines: &[LineDraft],
    ) -> DbResult<(Invoice, Vec<SaleLine>)> {
        debug!(dni_nie = %dni_nie, count = lines.len(), "Creating invoice with lines");

        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        let result = sqlx::query("INSERT INTO invoices (dni_nie, issued_on) VALUES (?1, ?2)")
            .bind(dni_nie)
            .bind(issued_on)
            .execute(&mut *tx)
            .await?;
        let invoice = Invoice {
            id: result.last_insert_rowid(),
            dni_nie: dni_nie.to_string(),
            issued_on,
        };

        let saved = insert_lines(&mut *tx, invoice.id, lines).await?;

        tx.commit().await.map_err(tx_error)?;

        debug!(id = invoice.id, count = saved.len(), "Invoice created with lines");
        Ok((invoice, saved))
    }

    /// Gets the sale lines of an invoice in entry order.
    pub async fn lines(&self, invoice_id: i64) -> DbResult<Vec<SaleLine>> {
        debug!(invoice_id, "Getting sale lines");

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE invoice_id = ?1 ORDER BY id");
        let lines = sqlx::query_as::<_, SaleLine>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Deletes an invoice and all of its lines atomically.
    ///
    /// Returns the number of sale lines removed.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting invoice");

        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        let lines = sqlx::query("DELETE FROM sales WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let headers = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if headers == 0 {
            // dropping `tx` rolls back
            return Err(DbError::not_found("Invoice", id));
        }

        tx.commit().await.map_err(tx_error)?;

        debug!(id, lines, "Invoice deleted");
        Ok(lines)
    }

    /// Counts invoice headers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    lines: &[LineDraft],
) -> DbResult<Vec<SaleLine>> {
    let mut saved = Vec::with_capacity(lines.len());
    for line in lines {
        let line_total = line.line_total();
        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                invoice_id, product_code, product_name,
                quantity, unit_price, line_total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(invoice_id)
        .bind(line.product_code)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line_total)
        .execute(&mut *conn)
        .await?;

        saved.push(SaleLine {
            id: result.last_insert_rowid(),
            invoice_id,
            product_code: line.product_code,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total,
        });
    }

    Ok(saved)
}

// =============================================================================
// Unit Tests
// =============================================================================
