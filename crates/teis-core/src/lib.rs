//! # teis-core: Pure Business Logic for Teis POS
//!
//! This crate is the **heart** of Teis POS. It contains the business rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Teis POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 backoffice (record managers)                    │   │
//! │  │   customers ──► products ──► invoices ──► reports ──► theme     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ teis-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │ validation│  │   │
//! │  │   │ Customer  │  │   Money   │  │   Draft   │  │  DNI/NIE  │  │   │
//! │  │   │  Product  │  │  TaxRate  │  │  Totals   │  │  email    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         teis-db (SQLite)        teis-reports (PDF, CSV)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Invoice, SaleLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`invoice`] - Invoice drafts and subtotal / IVA / total computation
//! - [`error`] - Domain error types
//! - [`validation`] - DNI/NIE check letter, email, mobile, price rules
//!
//! ## Example Usage
//!
//! ```rust
//! use teis_core::invoice::InvoiceTotals;
//! use teis_core::money::Money;
//! use teis_core::VAT_RATE;
//!
//! let lines = [Money::from_cents(2000), Money::from_cents(550)];
//! let totals = InvoiceTotals::from_line_totals(lines, VAT_RATE);
//!
//! assert_eq!(totals.subtotal.cents(), 2550);
//! assert_eq!(totals.tax.cents(), 536);
//! assert_eq!(totals.total.cents(), 3086);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceDraft, InvoiceTotals, LineDraft};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// IVA applied to every invoice (21%).
pub const VAT_RATE: TaxRate = TaxRate::from_bps(2100);

/// National ID of the placeholder customer used when an invoice is issued
/// without a known customer.
///
/// `00000000T` is itself a valid DNI (0 mod 23 → 'T'), and the initial
/// migration seeds a customer row with this key.
pub const DUMMY_CUSTOMER_DNI: &str = "00000000T";

/// Product families offered by the product form.
pub const PRODUCT_FAMILIES: &[&str] = &["Foods", "Furniture", "Clothes", "Electronic"];

/// Currency symbols offered by the product form.
pub const CURRENCIES: &[&str] = &["€", "$"];

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Highest unit price a product may carry, in cents (10 000 000.00).
///
/// Keeps `price × MAX_LINE_QUANTITY` summed over any realistic invoice
/// well inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 1_000_000_000;
