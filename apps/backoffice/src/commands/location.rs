//! # Location Commands
//!
//! Province and city lists for the customer form.

use teis_core::Province;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// All provinces in reference order.
pub async fn list_provinces(db: &DbState) -> ApiResult<Vec<Province>> {
    debug!("list_provinces command");
    Ok(db.get().await.locations().provinces().await?)
}

/// Municipalities of `province`, alphabetically.
pub async fn list_cities(db: &DbState, province: &str) -> ApiResult<Vec<String>> {
    let province = province.trim();
    if province.is_empty() {
        return Err(ApiError::validation("province is required"));
    }
    debug!(province = %province, "list_cities command");
    Ok(db.get().await.locations().cities(province).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teis_db::DbConfig;

    #[tokio::test]
    async fn test_reference_data() {
        let db = DbState::open(DbConfig::in_memory()).await.unwrap();

        let provinces = list_provinces(&db).await.unwrap();
        assert_eq!(provinces.len(), 52);
        assert_eq!(provinces[0].name, "A Coruña");

        let cities = list_cities(&db, "Pontevedra").await.unwrap();
        assert!(cities.iter().any(|c| c == "Vigo"));

        assert!(list_cities(&db, "Atlantis").await.unwrap().is_empty());
        assert!(list_cities(&db, "").await.is_err());
    }
}
