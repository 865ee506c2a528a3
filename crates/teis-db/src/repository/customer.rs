//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_customer("12345678Z")                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE customers SET is_active = 0 WHERE dni_nie = ?                  │
//! │       │                                                                 │
//! │       ├── list(show_all = false)  → row hidden                          │
//! │       └── list(show_all = true)   → row shown, is_active = false        │
//! │                                                                         │
//! │  Rows are never removed: invoices keep pointing at a real customer.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teis_core::Customer;

const CUSTOMER_COLUMNS: &str = r#"
    dni_nie, registered_on, surname, name, email, mobile,
    address, province, city, invoice_type, is_active
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers ordered by surname.
    ///
    /// ## Arguments
    /// * `show_all` - `false` lists only active customers, `true` adds the
    ///   logically deleted ones
    pub async fn list(&self, show_all: bool) -> DbResult<Vec<Customer>> {
        debug!(show_all, "Listing customers");

        let sql = if show_all {
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY surname, name")
        } else {
            format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE is_active = 1 ORDER BY surname, name"
            )
        };

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = customers.len(), "Customers listed");
        Ok(customers)
    }

    /// Gets a customer by national ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found (active or not)
    /// * `Ok(None)` - No such national ID
    pub async fn get(&self, dni_nie: &str) -> DbResult<Option<Customer>> {
        debug!(dni_nie = %dni_nie, "Getting customer");

        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE dni_nie = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(dni_nie)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Gets the first customer registered with a mobile number.
    pub async fn find_by_mobile(&self, mobile: &str) -> DbResult<Option<Customer>> {
        debug!(mobile = %mobile, "Finding customer by mobile");

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE mobile = ?1 ORDER BY is_active DESC, surname LIMIT 1"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(mobile)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    ///
    /// ## Errors
    /// * `UniqueViolation` - the national ID is already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(dni_nie = %customer.dni_nie, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                dni_nie, registered_on, surname, name, email, mobile,
                address, province, city, invoice_type, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&customer.dni_nie)
        .bind(customer.registered_on)
        .bind(&customer.surname)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.mobile)
        .bind(&customer.address)
        .bind(&customer.province)
        .bind(&customer.city)
        .bind(customer.invoice_type)
        .bind(customer.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(customer.dni_nie.clone()))?;

        Ok(())
    }

    /// Overwrites every field of the customer keyed by `customer.dni_nie`.
    ///
    /// ## Errors
    /// * `NotFound` - no row with that national ID
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(dni_nie = %customer.dni_nie, is_active = customer.is_active, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                registered_on = ?2,
                surname = ?3,
                name = ?4,
                email = ?5,
                mobile = ?6,
                address = ?7,
                province = ?8,
                city = ?9,
                invoice_type = ?10,
                is_active = ?11
            WHERE dni_nie = ?1
            "#,
        )
        .bind(&customer.dni_nie)
        .bind(customer.registered_on)
        .bind(&customer.surname)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.mobile)
        .bind(&customer.address)
        .bind(&customer.province)
        .bind(&customer.city)
        .bind(customer.invoice_type)
        .bind(customer.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.dni_nie));
        }
        Ok(())
    }

    /// Marks a customer inactive.
    ///
    /// Deactivating an already inactive customer succeeds.
    pub async fn deactivate(&self, dni_nie: &str) -> DbResult<()> {
        debug!(dni_nie = %dni_nie, "Deactivating customer");

        let result = sqlx::query("UPDATE customers SET is_active = 0 WHERE dni_nie = ?1")
            .bind(dni_nie)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", dni_nie));
        }
        Ok(())
    }

    /// Counts all customer rows, including the placeholder customer.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use teis_core::{InvoiceType, DUMMY_CUSTOMER_DNI};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn customer(dni: &str, surname: &str, mobile: &str) -> Customer {
        Customer {
            dni_nie: dni.to_string(),
            registered_on: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            surname: surname.to_string(),
            name: "Marta".to_string(),
            email: "marta@mail.com".to_string(),
            mobile: mobile.to_string(),
            address: "Avda. de Galicia 5".to_string(),
            province: "Pontevedra".to_string(),
            city: "Vigo".to_string(),
            invoice_type: InvoiceType::Paper,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = setup().await;
        let repo = db.customers();
        let original = customer("12345678Z", "Otero", "612345678");

        repo.insert(&original).await.unwrap();
        let fetched = repo.get("12345678Z").await.unwrap().unwrap();

        assert_eq!(fetched, original);
    }

    #[tokio::test]
    async fn test_duplicate_dni_rejected() {
        let db = setup().await;
        let repo = db.customers();
        repo.insert(&customer("12345678Z", "Otero", "612345678"))
            .await
            .unwrap();

        let err = repo
            .insert(&customer("12345678Z", "Vila", "622222222"))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "12345678Z"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_ordered_by_surname() {
        let db = setup().await;
        let repo = db.customers();
        repo.insert(&customer("12345678Z", "Vila", "612345678"))
            .await
            .unwrap();
        repo.insert(&customer("00000001R", "Abal", "622222222"))
            .await
            .unwrap();

        let surnames: Vec<String> = repo
            .list(false)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.dni_nie != DUMMY_CUSTOMER_DNI)
            .map(|c| c.surname)
            .collect();
        assert_eq!(surnames, vec!["Abal", "Vila"]);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_list() {
        let db = setup().await;
        let repo = db.customers();
        repo.insert(&customer("12345678Z", "Otero", "612345678"))
            .await
            .unwrap();

        repo.deactivate("12345678Z").await.unwrap();

        let active = repo.list(false).await.unwrap();
        assert!(active.iter().all(|c| c.dni_nie != "12345678Z"));

        let all = repo.list(true).await.unwrap();
        let deleted = all.iter().find(|c| c.dni_nie == "12345678Z").unwrap();
        assert!(!deleted.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_customer_is_not_found() {
        let db = setup().await;
        let repo = db.customers();

        let err = repo
            .update(&customer("12345678Z", "Otero", "612345678"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = repo.deactivate("12345678Z").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_and_find_by_mobile() {
        let db = setup().await;
        let repo = db.customers();
        let mut c = customer("12345678Z", "Otero", "612345678");
        repo.insert(&c).await.unwrap();

        c.mobile = "699999999".to_string();
        c.invoice_type = InvoiceType::Electronic;
        repo.update(&c).await.unwrap();

        let found = repo.find_by_mobile("699999999").await.unwrap().unwrap();
        assert_eq!(found.dni_nie, "12345678Z");
        assert_eq!(found.invoice_type, InvoiceType::Electronic);
        assert!(repo.find_by_mobile("612345678").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_placeholder_customer_is_seeded() {
        let db = setup().await;
        let dummy = db.customers().get(DUMMY_CUSTOMER_DNI).await.unwrap();
        assert!(dummy.is_some());
        assert_eq!(db.customers().count().await.unwrap(), 1);
    }
}
