//! # Validation Module
//!
//! Input validation utilities for Teis POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command (backoffice)                                         │
//! │  ├── Form DTO deserialization                                          │
//! │  └── THIS MODULE: field rules, normalisation                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on customers.dni_nie                                  │
//! │  ├── UNIQUE on products.name                                           │
//! │  └── Foreign key sales.invoice_id → invoices.id                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator returns the normalised value (or `()`) on success and a
//! [`ValidationError`] naming the field on failure.
//!
//! ## Usage
//! ```rust
//! use teis_core::validation::{validate_dni_nie, validate_quantity};
//!
//! assert_eq!(validate_dni_nie(" 12345678z ").unwrap(), "12345678Z");
//! assert!(validate_quantity(5).is_ok());
//! ```

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, CustomerForm, NewProduct, ProductForm};
use crate::{CURRENCIES, MAX_LINE_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check letter for each remainder of the 8-digit number modulo 23.
const DNI_CHECK_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("valid regex"));

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[67]\d{8}$").expect("valid regex"));

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// National ID (DNI / NIE)
// =============================================================================

/// Validates a Spanish DNI or NIE and returns it normalised.
///
/// ## Algorithm
/// ```text
///   "x1234567l"  ──trim/upper──►  "X1234567L"
///                                  │       │
///            X→0, Y→1, Z→2  ◄──────┘       └──► check letter 'L'
///                 │
///          "01234567" = 1234567
///                 │
///          1234567 % 23 = 19  ──►  TABLE[19] = 'L'  ✓
/// ```
///
/// ## Example
/// ```rust
/// use teis_core::validation::validate_dni_nie;
///
/// assert!(validate_dni_nie("12345678Z").is_ok());
/// assert!(validate_dni_nie("X1234567L").is_ok());
/// assert!(validate_dni_nie("12345678A").is_err());
/// ```
pub fn validate_dni_nie(input: &str) -> ValidationResult<String> {
    let normalised = input.trim().to_uppercase();
    if normalised.is_empty() {
        return Err(required("dni_nie"));
    }

    let chars: Vec<char> = normalised.chars().collect();
    if chars.len() != 9 {
        return Err(invalid("dni_nie", "must be 9 characters"));
    }

    let check = chars[8];
    let mut digits = String::with_capacity(8);
    for (i, c) in chars[..8].iter().copied().enumerate() {
        let mapped = match (i, c) {
            (0, 'X') => '0',
            (0, 'Y') => '1',
            (0, 'Z') => '2',
            (_, c) if c.is_ascii_digit() => c,
            _ => return Err(invalid("dni_nie", "must be 8 digits and a letter")),
        };
        digits.push(mapped);
    }

    let number: u32 = digits
        .parse()
        .map_err(|_| invalid("dni_nie", "must be 8 digits and a letter"))?;
    let expected = DNI_CHECK_LETTERS[(number % 23) as usize] as char;

    if check != expected {
        return Err(invalid("dni_nie", "check letter does not match"));
    }

    Ok(normalised)
}

// =============================================================================
// Contact Validators
// =============================================================================

/// Validates an email address (`name@domain.tld`).
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(required("email"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid("email", "expected name@domain.tld"));
    }
    Ok(email.to_lowercase())
}

/// Validates a Spanish mobile number: 9 digits starting with 6 or 7.
pub fn validate_mobile(mobile: &str) -> ValidationResult<String> {
    let mobile = mobile.trim();
    if mobile.is_empty() {
        return Err(required("mobile"));
    }
    if !MOBILE_RE.is_match(mobile) {
        return Err(invalid("mobile", "expected 9 digits starting with 6 or 7"));
    }
    Ok(mobile.to_string())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Rejects blank text and returns it trimmed.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(required(field));
    }
    Ok(value.to_string())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = validate_required("name", name)?;
    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }
    Ok(name)
}

/// Capitalises the first letter of every word and lowercases the rest.
///
/// Any non-alphabetic character starts a new word, so `"garcía-lópez"`
/// becomes `"García-López"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.trim().chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level (zero allowed).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Parses a typed unit price and requires it to be greater than zero and
/// at most [`MAX_UNIT_PRICE_CENTS`].
///
/// ## Example
/// ```rust
/// use teis_core::validation::validate_unit_price;
///
/// assert_eq!(validate_unit_price("12,5").unwrap().cents(), 1250);
/// assert!(validate_unit_price("0").is_err());
/// assert!(validate_unit_price("1.999").is_err());
/// ```
pub fn validate_unit_price(input: &str) -> ValidationResult<Money> {
    let price: Money = input.parse().map_err(|err| match err {
        ValidationError::Required { .. } => required("unit_price"),
        ValidationError::InvalidFormat { reason, .. } => invalid("unit_price", &reason),
        other => other,
    })?;

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }
    if price.cents() > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }
    Ok(price)
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a customer form into a storable record.
///
/// `today` fills in the registration date when the form leaves it empty.
/// The returned customer is always active; reactivation of an existing
/// customer is decided by the caller.
pub fn validate_customer_form(form: CustomerForm, today: NaiveDate) -> ValidationResult<Customer> {
    Ok(Customer {
        dni_nie: validate_dni_nie(&form.dni_nie)?,
        registered_on: form.registered_on.unwrap_or(today),
        surname: title_case(&validate_required("surname", &form.surname)?),
        name: title_case(&validate_required("name", &form.name)?),
        email: validate_email(&form.email)?,
        mobile: validate_mobile(&form.mobile)?,
        address: validate_required("address", &form.address)?,
        province: validate_required("province", &form.province)?,
        city: validate_required("city", &form.city)?,
        invoice_type: form.invoice_type,
        is_active: true,
    })
}

/// Validates a product form.
pub fn validate_product_form(form: ProductForm) -> ValidationResult<NewProduct> {
    let name = validate_product_name(&form.name)?;

    let stock_text = validate_required("stock", &form.stock)?;
    let stock: i64 = stock_text
        .parse()
        .map_err(|_| invalid("stock", "must be a whole number"))?;
    validate_stock(stock)?;

    let family = validate_required("family", &form.family)?;
    let unit_price = validate_unit_price(&form.unit_price)?;

    let currency = form.currency.trim();
    if !CURRENCIES.contains(&currency) {
        return Err(ValidationError::NotAllowed {
            field: "currency".to_string(),
            allowed: CURRENCIES.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(NewProduct {
        name,
        stock,
        family,
        unit_price,
        currency: currency.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
