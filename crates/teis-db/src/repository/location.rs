//! # Location Repository
//!
//! Read-only provinces and municipalities for the customer form.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use teis_core::Province;

/// Repository for the reference location tables.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    /// Creates a new LocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Lists provinces in reference order.
    pub async fn provinces(&self) -> DbResult<Vec<Province>> {
        let provinces = sqlx::query_as::<_, Province>("SELECT id, name FROM provinces ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(provinces)
    }

    /// Lists the municipalities of the province called `province`.
    ///
    /// An unknown province yields an empty list.
    pub async fn cities(&self, province: &str) -> DbResult<Vec<String>> {
        debug!(province = %province, "Listing municipalities");

        let cities: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT m.name
            FROM municipalities m
            INNER JOIN provinces p ON p.id = m.province_id
            WHERE p.name = ?1
            ORDER BY m.name
            "#,
        )
        .bind(province)
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_reference_data_loaded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.locations();

        let provinces = repo.provinces().await.unwrap();
        assert_eq!(provinces.len(), 52);
        assert!(provinces.iter().any(|p| p.name == "Pontevedra"));

        let cities = repo.cities("Pontevedra").await.unwrap();
        assert!(cities.contains(&"Vigo".to_string()));

        assert!(repo.cities("Atlantis").await.unwrap().is_empty());
    }
}
