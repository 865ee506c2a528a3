//! # Product Commands
//!
//! Product record manager. Products are looked up and deleted by name,
//! updated by code, and physically removed on delete.

use teis_core::validation::{validate_product_form, validate_product_name};
use teis_core::{Product, ProductForm};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// Lists all products by code.
pub async fn list_products(db: &DbState) -> ApiResult<Vec<Product>> {
    debug!("list_products command");
    Ok(db.get().await.products().list().await?)
}

/// Gets a product by its exact name.
pub async fn get_product(db: &DbState, name: &str) -> ApiResult<Product> {
    let name = validate_product_name(name)?;
    debug!(name = %name, "get_product command");

    db.get()
        .await
        .products()
        .get_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &name))
}

/// Gets a product by code.
pub async fn get_product_by_code(db: &DbState, code: i64) -> ApiResult<Product> {
    debug!(code, "get_product_by_code command");

    db.get()
        .await
        .products()
        .get_by_code(code)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &code.to_string()))
}

/// Validates and stores a new product. The code is assigned by the database.
pub async fn create_product(db: &DbState, form: ProductForm) -> ApiResult<Product> {
    let product = validate_product_form(form)?;
    debug!(name = %product.name, "create_product command");

    let created = db.get().await.products().insert(&product).await?;

    info!(code = created.code, name = %created.name, "Product created");
    Ok(created)
}

/// Overwrites the product with `code`.
pub async fn modify_product(db: &DbState, code: i64, form: ProductForm) -> ApiResult<Product> {
    let product = validate_product_form(form)?;
    debug!(code, name = %product.name, "modify_product command");

    let updated = db.get().await.products().update(code, &product).await?;

    info!(code = updated.code, name = %updated.name, "Product modified");
    Ok(updated)
}

/// Deletes the product called `name`.
///
/// Sale lines keep their own copy of the name and price.
pub async fn delete_product(db: &DbState, name: &str) -> ApiResult<()> {
    let name = validate_product_name(name)?;
    debug!(name = %name, "delete_product command");

    db.get().await.products().delete_by_name(&name).await?;

    info!(name = %name, "Product deleted");
    Ok(())
}

/// Families that currently have products, for the per-family report.
pub async fn product_families(db: &DbState) -> ApiResult<Vec<String>> {
    debug!("product_families command");
    Ok(db.get().await.products().families().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use teis_db::DbConfig;

    async fn state() -> DbState {
        DbState::open(DbConfig::in_memory()).await.unwrap()
    }

    fn form(name: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            stock: "12".to_string(),
            family: "Foods".to_string(),
            unit_price: price.to_string(),
            currency: "€".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_get_modify_delete() {
        let db = state().await;

        let created = create_product(&db, form("Pan de Cea", "2.50")).await.unwrap();
        assert_eq!(created.unit_price.cents(), 250);

        let fetched = get_product(&db, "Pan de Cea").await.unwrap();
        assert_eq!(fetched, created);

        let modified = modify_product(&db, created.code, form("Pan de Cea", "2.75"))
            .await
            .unwrap();
        assert_eq!(modified.code, created.code);
        assert_eq!(modified.unit_price.cents(), 275);

        delete_product(&db, "Pan de Cea").await.unwrap();
        let err = get_product(&db, "Pan de Cea").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let db = state().await;
        create_product(&db, form("Pan de Cea", "2.50")).await.unwrap();

        let err = create_product(&db, form("Pan de Cea", "3.00"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[tokio::test]
    async fn test_invalid_price_and_missing_rows() {
        let db = state().await;

        let err = create_product(&db, form("Pan", "0")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = modify_product(&db, 999, form("Pan", "1.00")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_product(&db, "Pan").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_orders_by_code() {
        let db = state().await;
        create_product(&db, form("B", "1.00")).await.unwrap();
        create_product(&db, form("A", "1.00")).await.unwrap();

        let names: Vec<String> = list_products(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);

        let first = get_product_by_code(&db, 1).await.unwrap();
        assert_eq!(first.name, "B");
    }
}
