//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  code (INTEGER, auto)   ← referenced by sale lines, used for updates   │
//! │  name (TEXT, UNIQUE)    ← what the operator types: get / delete        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a product removes the row. Sale lines keep their own copy of
//! the name and price, so issued invoices are unaffected.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teis_core::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "code, name, stock, family, unit_price, currency";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.insert(&new_product).await?;
/// let same = repo.get_by_name(&product.name).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY code");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Products listed");
        Ok(products)
    }

    /// Gets a product by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        debug!(name = %name, "Getting product by name");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its code.
    pub async fn get_by_code(&self, code: i64) -> DbResult<Option<Product>> {
        debug!(code, "Getting product by code");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its assigned code.
    ///
    /// ## Errors
    /// * `UniqueViolation` - a product with the same name exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, stock, family, unit_price, currency)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.name)
        .bind(product.stock)
        .bind(&product.family)
        .bind(product.unit_price)
        .bind(&product.currency)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(product.name.clone()))?;

        let code = result.last_insert_rowid();
        debug!(code, "Product inserted");
        Ok(product.clone().with_code(code))
    }

    /// Overwrites the product with `code`.
    ///
    /// ## Errors
    /// * `NotFound` - no product with that code
    /// * `UniqueViolation` - renamed onto another product's name
    pub async fn update(&self, code: i64, product: &NewProduct) -> DbResult<Product> {
        debug!(code, name = %product.name, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                stock = ?3,
                family = ?4,
                unit_price = ?5,
                currency = ?6
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .bind(&product.name)
        .bind(product.stock)
        .bind(&product.family)
        .bind(product.unit_price)
        .bind(&product.currency)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(product.name.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }
        Ok(product.clone().with_code(code))
    }

    /// Deletes the product with `name`.
    pub async fn delete_by_name(&self, name: &str) -> DbResult<()> {
        debug!(name = %name, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", name));
        }
        Ok(())
    }

    /// Distinct families that have at least one product, alphabetically.
    pub async fn families(&self) -> DbResult<Vec<String>> {
        let families: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT family FROM products ORDER BY family")
                .fetch_all(&self.pool)
                .await?;

        debug!(count = families.len(), "Product families listed");
        Ok(families)
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
