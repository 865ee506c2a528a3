//! # Invoice Computation
//!
//! Line-item drafts and the subtotal / IVA / total calculation.
//!
//! ## Draft Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pick product ──► add_line(product, qty) ──► LineDraft (snapshot)      │
//! │                                                 │                       │
//! │  edit qty     ──► set_quantity(i, qty)   ───────┤                       │
//! │  swap product ──► set_product(i, product) ──────┤                       │
//! │                                                 ▼                       │
//! │                                   InvoiceDraft::totals(VAT_RATE)        │
//! │                                                 │                       │
//! │                      subtotal = Σ line_total ◄──┘                       │
//! │                      tax      = round_half_up(subtotal × 21%)           │
//! │                      total    = subtotal + tax                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The draft never touches the database; `save_sales` in the back office
//! persists it line by line.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleLine, TaxRate};
use crate::validation::validate_quantity;

// =============================================================================
// Line Draft
// =============================================================================

/// One line of an invoice being built.
///
/// Carries a copy of the product's name and price at the moment it was
/// picked, so the saved sale line matches what the operator saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineDraft {
    pub product_code: i64,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineDraft {
    /// Creates a line from a product, validating the quantity.
    pub fn new(product: &Product, quantity: i64) -> CoreResult<Self> {
        validate_quantity(quantity)?;
        Ok(LineDraft {
            product_code: product.code,
            product_name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
        })
    }

    /// unit_price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// Lines accumulated for one invoice before they are saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    lines: Vec<LineDraft>,
}

impl InvoiceDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in entry order.
    pub fn lines(&self) -> &[LineDraft] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Appends a line for `product`.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<&LineDraft> {
        let line = LineDraft::new(product, quantity)?;
        self.lines.push(line);
        let last = self.lines.len() - 1;
        Ok(&self.lines[last])
    }

    /// Changes the quantity of line `index`.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<&LineDraft> {
        validate_quantity(quantity)?;
        let line = self.line_mut(index)?;
        line.quantity = quantity;
        Ok(&*line)
    }

    /// Replaces the product of line `index`, keeping its quantity.
    pub fn set_product(&mut self, index: usize, product: &Product) -> CoreResult<&LineDraft> {
        let line = self.line_mut(index)?;
        line.product_code = product.code;
        line.product_name = product.name.clone();
        line.unit_price = product.unit_price;
        Ok(&*line)
    }

    /// Removes and returns line `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<LineDraft> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Subtotal, tax and total over every line.
    pub fn totals(&self, rate: TaxRate) -> InvoiceTotals {
        InvoiceTotals::from_line_totals(self.lines.iter().map(LineDraft::line_total), rate)
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut LineDraft> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(CoreError::LineOutOfRange { index, len })
    }
}

impl FromIterator<LineDraft> for InvoiceDraft {
    fn from_iter<I: IntoIterator<Item = LineDraft>>(iter: I) -> Self {
        InvoiceDraft {
            lines: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Invoice totals in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Computes totals from line totals.
    ///
    /// ## Example
    /// ```rust
    /// use teis_core::{InvoiceTotals, Money, VAT_RATE};
    ///
    /// // [(10.00, 2), (5.50, 1)]
    /// let lines = [
    ///     Money::from_cents(1000).multiply_quantity(2),
    ///     Money::from_cents(550),
    /// ];
    /// let totals = InvoiceTotals::from_line_totals(lines, VAT_RATE);
    /// assert_eq!(totals.subtotal.to_string(), "25.50");
    /// assert_eq!(totals.tax.to_string(), "5.36");
    /// assert_eq!(totals.total.to_string(), "30.86");
    /// ```
    pub fn from_line_totals<I>(line_totals: I, rate: TaxRate) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal: Money = line_totals.into_iter().sum();
        let tax = subtotal.calculate_tax(rate);
        InvoiceTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Totals over stored sale lines.
    pub fn from_sale_lines(lines: &[SaleLine], rate: TaxRate) -> Self {
        Self::from_line_totals(lines.iter().map(|l| l.line_total), rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE_CENTS, VAT_RATE};
    use proptest::prelude::*;

    fn product(code: i64, name: &str, cents: i64) -> Product {
        Product {
            code,
            name: name.to_string(),
            stock: 10,
            family: "Foods".to_string(),
            unit_price: Money::from_cents(cents),
            currency: "€".to_string(),
        }
    }

    #[test]
    fn test_totals_example() {
        let mut draft = InvoiceDraft::new();
        draft.add_line(&product(1, "Aceite", 1000), 2).unwrap();
        draft.add_line(&product(2, "Pan", 550), 1).unwrap();

        let totals = draft.totals(VAT_RATE);
        assert_eq!(totals.subtotal.cents(), 2550);
        assert_eq!(totals.tax.cents(), 536);
        assert_eq!(totals.total.cents(), 3086);
    }

    #[test]
    fn test_empty_draft_totals_are_zero() {
        let totals = InvoiceDraft::new().totals(VAT_RATE);
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn test_edit_line_recomputes_totals() {
        let mut draft = InvoiceDraft::new();
        draft.add_line(&product(1, "Aceite", 1000), 1).unwrap();

        let line = draft.set_quantity(0, 3).unwrap();
        assert_eq!(line.line_total().cents(), 3000);

        let line = draft.set_product(0, &product(2, "Pan", 200)).unwrap();
        assert_eq!(line.product_name, "Pan");
        assert_eq!(line.quantity, 3);
        assert_eq!(draft.totals(VAT_RATE).subtotal.cents(), 600);
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut draft = InvoiceDraft::new();
        assert!(matches!(
            draft.add_line(&product(1, "Aceite", 1000), 0),
            Err(CoreError::Validation(_))
        ));
        assert!(draft.is_empty());

        draft.add_line(&product(1, "Aceite", 1000), 1).unwrap();
        assert!(draft.set_quantity(0, 1000).is_err());
        assert_eq!(draft.lines()[0].quantity, 1);
    }

    #[test]
    fn test_line_out_of_range() {
        let mut draft = InvoiceDraft::new();
        assert!(matches!(
            draft.set_quantity(2, 1),
            Err(CoreError::LineOutOfRange { index: 2, len: 0 })
        ));
        assert!(draft.remove_line(0).is_err());
    }

    #[test]
    fn test_snapshot_is_independent_of_product() {
        let mut p = product(1, "Aceite", 1000);
        let mut draft = InvoiceDraft::new();
        draft.add_line(&p, 1).unwrap();

        p.unit_price = Money::from_cents(9999);
        assert_eq!(draft.lines()[0].unit_price.cents(), 1000);
    }

    #[test]
    fn test_from_sale_lines() {
        let lines = vec![SaleLine {
            id: 1,
            invoice_id: 1,
            product_code: 1,
            product_name: "Aceite".to_string(),
            quantity: 2,
            unit_price: Money::from_cents(1000),
            line_total: Money::from_cents(2000),
        }];
        let totals = InvoiceTotals::from_sale_lines(&lines, VAT_RATE);
        assert_eq!(totals.total.cents(), 2420);
    }

    #[test]
    fn test_oversized_price_does_not_panic() {
        let mut draft = InvoiceDraft::new();
        draft.add_line(&product(1, "Yate", i64::MAX / 2), 2).unwrap();
        draft.add_line(&product(2, "Yate", i64::MAX / 2), 2).unwrap();

        let totals = draft.totals(VAT_RATE);
        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert_eq!(totals.total.cents(), i64::MAX);
    }

    #[test]
    fn test_largest_valid_invoice_line_is_exact() {
        let mut draft = InvoiceDraft::new();
        draft
            .add_line(&product(1, "Grúa", MAX_UNIT_PRICE_CENTS), MAX_LINE_QUANTITY)
            .unwrap();

        let totals = draft.totals(VAT_RATE);
        assert_eq!(totals.subtotal.cents(), MAX_UNIT_PRICE_CENTS * MAX_LINE_QUANTITY);
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    proptest! {
        #[test]
        fn totals_round_tax_to_nearest_cent(
            lines in prop::collection::vec(
                (1i64..=MAX_UNIT_PRICE_CENTS, 1i64..=MAX_LINE_QUANTITY),
                0..20,
            ),
        ) {
            let mut draft = InvoiceDraft::new();
            for (i, (cents, qty)) in lines.iter().enumerate() {
                draft.add_line(&product(i as i64 + 1, "Item", *cents), *qty).unwrap();
            }

            let totals = draft.totals(VAT_RATE);
            let expected: i64 = lines.iter().map(|(cents, qty)| cents * qty).sum();
            prop_assert_eq!(totals.subtotal.cents(), expected);

            // |tax - subtotal × 21%| is at most half a cent
            let error = totals.tax.cents() as i128 * 10_000 - expected as i128 * 2100;
            prop_assert!(error.abs() <= 5000);
            prop_assert_eq!(totals.total.cents(), expected + totals.tax.cents());
        }
    }
}
