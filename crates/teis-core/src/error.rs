//! # Error Types
//!
//! Domain-specific error types for teis-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  teis-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Form field validation failures                 │
//! │                                                                         │
//! │  teis-db errors        └── DbError      - Database failures            │
//! │  teis-reports errors   └── ReportError  - PDF / CSV output failures    │
//! │  backoffice errors     └── ApiError     - What the operator sees       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → launcher exit code     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed check never clears a field or flips a colour here: it returns a
//! variant naming the field, and the caller decides how to present it.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No customer with this national ID.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// No product with this code or name.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No invoice with this ID.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(i64),

    /// Saving sales requires at least one complete line.
    #[error("Invoice {0} has no line items")]
    EmptyInvoice(i64),

    /// Line index outside the draft.
    #[error("Line {index} does not exist (draft has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// Used for early validation before anything reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad check letter, malformed email, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CustomerNotFound("12345678Z".to_string());
        assert_eq!(err.to_string(), "Customer not found: 12345678Z");

        let err = CoreError::EmptyInvoice(7);
        assert_eq!(err.to_string(), "Invoice 7 has no line items");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "surname".to_string(),
        };
        assert_eq!(err.to_string(), "surname is required");
        assert_eq!(err.field(), "surname");

        let err = ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        };
        assert_eq!(err.to_string(), "unit_price must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "dni_nie".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
