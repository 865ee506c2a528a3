//! # Domain Types
//!
//! Core domain types used throughout Teis POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Invoice     │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  dni_nie (PK)   │◄──│  dni_nie        │   │  invoice_id(FK) │       │
//! │  │  surname, name  │   │  id (auto)      │◄──│  product_code   │       │
//! │  │  invoice_type   │   │  issued_on      │   │  product_name * │       │
//! │  │  is_active      │   └─────────────────┘   │  unit_price   * │       │
//! │  └─────────────────┘                         │  quantity       │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Product      │   │     TaxRate     │   * frozen at sale time     │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  code (auto)    │   │  bps (u32)      │                             │
//! │  │  name (unique)  │   │  2100 = 21%     │                             │
//! │  │  unit_price     │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Form Types
//! `CustomerForm` and `ProductForm` carry raw operator input by value.
//! [`crate::validation`] turns them into `Customer` / `NewProduct`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (Spanish general IVA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        crate::VAT_RATE
    }
}

// =============================================================================
// Invoice Type
// =============================================================================

/// How the customer wants to receive invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Sent by email.
    #[default]
    Electronic,
    /// Printed on paper.
    Paper,
}

impl InvoiceType {
    /// Lowercase name as stored in the database and CSV export.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Electronic => "electronic",
            InvoiceType::Paper => "paper",
        }
    }
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electronic" => Ok(InvoiceType::Electronic),
            "paper" => Ok(InvoiceType::Paper),
            _ => Err(ValidationError::NotAllowed {
                field: "invoice_type".to_string(),
                allowed: vec!["electronic".to_string(), "paper".to_string()],
            }),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record, keyed by national ID.
///
/// ## Lifecycle
/// - Created active on save
/// - Updated as a full record keyed by `dni_nie`
/// - "Deleted" by setting `is_active = false`; the row is never removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// DNI or NIE, upper-case, check letter verified.
    pub dni_nie: String,
    /// Day the customer was registered.
    #[ts(as = "String")]
    pub registered_on: NaiveDate,
    pub surname: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub province: String,
    pub city: String,
    pub invoice_type: InvoiceType,
    /// False once the customer has been logically deleted.
    pub is_active: bool,
}

impl Customer {
    /// "Name Surname", as printed on invoice headers.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// "Address City Province", as printed on invoice headers.
    pub fn full_address(&self) -> String {
        format!("{} {} {}", self.address, self.city, self.province)
    }

    /// Human-readable status label.
    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

/// Raw customer form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerForm {
    pub dni_nie: String,
    /// Registration date; `None` means "today" (resolved by the caller).
    #[ts(as = "Option<String>")]
    pub registered_on: Option<NaiveDate>,
    pub surname: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub province: String,
    pub city: String,
    pub invoice_type: InvoiceType,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Auto-increment code, referenced by sale lines.
    pub code: i64,
    /// Business key, unique across products.
    pub name: String,
    pub stock: i64,
    /// Free-text category (see [`crate::PRODUCT_FAMILIES`]).
    pub family: String,
    pub unit_price: Money,
    /// Currency symbol, e.g. "€".
    pub currency: String,
}

/// A validated product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub stock: i64,
    pub family: String,
    pub unit_price: Money,
    pub currency: String,
}

impl NewProduct {
    /// Attaches the code assigned by the database.
    pub fn with_code(self, code: i64) -> Product {
        Product {
            code,
            name: self.name,
            stock: self.stock,
            family: self.family,
            unit_price: self.unit_price,
            currency: self.currency,
        }
    }
}

/// Raw product form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    pub stock: String,
    pub family: String,
    pub unit_price: String,
    pub currency: String,
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: i64,
    /// Customer national ID. Not a foreign key: the dummy customer is used
    /// when no customer is given.
    pub dni_nie: String,
    #[ts(as = "String")]
    pub issued_on: NaiveDate,
}

// =============================================================================
// Sale Line
// =============================================================================

/// A stored invoice line.
///
/// Product name and unit price are copied from the product when the line is
/// saved. Later product edits never change an issued invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: i64,
    pub invoice_id: i64,
    pub product_code: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// unit_price × quantity.
    pub line_total: Money,
}

// =============================================================================
// Reference Data
// =============================================================================

/// A Spanish province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Province {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
