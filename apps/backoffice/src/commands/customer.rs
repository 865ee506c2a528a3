//! # Customer Commands
//!
//! Customer record manager: list, lookup, create, modify, soft delete.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_customer ──► active ──── delete_customer ────► inactive         │
//! │                        ▲                                  │             │
//! │                        └─ modify_customer(reactivate) ────┘             │
//! │                                                                         │
//! │  Rows are never removed: inactive customers stay visible in the        │
//! │  historical view (`list_customers(show_all = true)`) and in reports.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Local;
use teis_core::validation::{validate_customer_form, validate_dni_nie, validate_mobile};
use teis_core::{Customer, CustomerForm};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// Lists customers by surname; inactive ones only when `show_all`.
pub async fn list_customers(db: &DbState, show_all: bool) -> ApiResult<Vec<Customer>> {
    debug!(show_all, "list_customers command");
    Ok(db.get().await.customers().list(show_all).await?)
}

/// Gets one customer by national ID (normalised before lookup).
pub async fn get_customer(db: &DbState, dni_nie: &str) -> ApiResult<Customer> {
    let dni = validate_dni_nie(dni_nie)?;
    debug!(dni_nie = %dni, "get_customer command");

    db.get()
        .await
        .customers()
        .get(&dni)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &dni))
}

/// Finds a customer by mobile number, preferring an active one.
pub async fn find_customer_by_mobile(db: &DbState, mobile: &str) -> ApiResult<Customer> {
    let mobile = validate_mobile(mobile)?;
    debug!(mobile = %mobile, "find_customer_by_mobile command");

    db.get()
        .await
        .customers()
        .find_by_mobile(&mobile)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &mobile))
}

/// Validates and stores a new, active customer.
///
/// A missing registration date becomes today.
pub async fn create_customer(db: &DbState, form: CustomerForm) -> ApiResult<Customer> {
    let customer = validate_customer_form(form, Local::now().date_naive())?;
    debug!(dni_nie = %customer.dni_nie, "create_customer command");

    db.get().await.customers().insert(&customer).await?;

    info!(dni_nie = %customer.dni_nie, "Customer created");
    Ok(customer)
}

/// Overwrites a customer's data.
///
/// The active flag is kept unless `reactivate` is set. A form without a
/// registration date keeps the stored one.
pub async fn modify_customer(
    db: &DbState,
    form: CustomerForm,
    reactivate: bool,
) -> ApiResult<Customer> {
    let database = db.get().await;
    let dni = validate_dni_nie(&form.dni_nie)?;
    debug!(dni_nie = %dni, reactivate, "modify_customer command");

    let existing = database
        .customers()
        .get(&dni)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &dni))?;

    let mut customer = validate_customer_form(form, existing.registered_on)?;
    customer.is_active = existing.is_active || reactivate;

    database.customers().update(&customer).await?;

    info!(dni_nie = %customer.dni_nie, active = customer.is_active, "Customer modified");
    Ok(customer)
}

/// Marks a customer inactive. The record is kept.
pub async fn delete_customer(db: &DbState, dni_nie: &str) -> ApiResult<()> {
    let dni = validate_dni_nie(dni_nie)?;
    debug!(dni_nie = %dni, "delete_customer command");

    db.get().await.customers().deactivate(&dni).await?;

    info!(dni_nie = %dni, "Customer deactivated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use teis_core::InvoiceType;
    use teis_db::DbConfig;

    async fn state() -> DbState {
        DbState::open(DbConfig::in_memory()).await.unwrap()
    }

    fn form(dni: &str, mobile: &str) -> CustomerForm {
        CustomerForm {
            dni_nie: dni.to_string(),
            registered_on: None,
            surname: "otero vila".to_string(),
            name: "marta".to_string(),
            email: "Marta@Mail.com".to_string(),
            mobile: mobile.to_string(),
            address: "Rúa Urzaiz 1".to_string(),
            province: "Pontevedra".to_string(),
            city: "Vigo".to_string(),
            invoice_type: InvoiceType::Electronic,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let db = state().await;
        let created = create_customer(&db, form(" 12345678z ", "612345678"))
            .await
            .unwrap();

        assert_eq!(created.dni_nie, "12345678Z");
        assert_eq!(created.surname, "Otero Vila");
        assert_eq!(created.email, "marta@mail.com");
        assert!(created.is_active);

        let fetched = get_customer(&db, "12345678z").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let db = state().await;
        create_customer(&db, form("12345678Z", "612345678"))
            .await
            .unwrap();

        let err = create_customer(&db, form("12345678Z", "622222222"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[tokio::test]
    async fn test_invalid_form_is_rejected() {
        let db = state().await;
        let err = create_customer(&db, form("12345678A", "612345678"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_customer(&db, form("12345678Z", "512345678"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_soft_delete_and_reactivate() {
        let db = state().await;
        create_customer(&db, form("12345678Z", "612345678"))
            .await
            .unwrap();

        delete_customer(&db, "12345678Z").await.unwrap();

        let active = list_customers(&db, false).await.unwrap();
        assert!(active.iter().all(|c| c.dni_nie != "12345678Z"));

        let all = list_customers(&db, true).await.unwrap();
        let deleted = all.iter().find(|c| c.dni_nie == "12345678Z").unwrap();
        assert!(!deleted.is_active);

        let kept = modify_customer(&db, form("12345678Z", "612345678"), false)
            .await
            .unwrap();
        assert!(!kept.is_active);

        let back = modify_customer(&db, form("12345678Z", "612345678"), true)
            .await
            .unwrap();
        assert!(back.is_active);
    }

    #[tokio::test]
    async fn test_modify_keeps_registration_date() {
        let db = state().await;
        let mut original = form("12345678Z", "612345678");
        original.registered_on = chrono::NaiveDate::from_ymd_opt(2020, 5, 17);
        create_customer(&db, original).await.unwrap();

        let mut changed = form("12345678Z", "699999999");
        changed.city = "Cangas".to_string();
        let modified = modify_customer(&db, changed, false).await.unwrap();

        assert_eq!(modified.city, "Cangas");
        assert_eq!(modified.mobile, "699999999");
        assert_eq!(
            modified.registered_on,
            chrono::NaiveDate::from_ymd_opt(2020, 5, 17).unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_customer_is_not_found() {
        let db = state().await;

        let err = modify_customer(&db, form("12345678Z", "612345678"), false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_customer(&db, "12345678Z").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = find_customer_by_mobile(&db, "612345678").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_find_by_mobile() {
        let db = state().await;
        create_customer(&db, form("12345678Z", "612345678"))
            .await
            .unwrap();

        let found = find_customer_by_mobile(&db, "612345678").await.unwrap();
        assert_eq!(found.dni_nie, "12345678Z");
    }
}
