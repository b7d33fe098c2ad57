//! Add-on service catalog repository

use async_trait::async_trait;
use hotel_core::{models::Service, traits::ServiceCatalogRepository, AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ServiceCatalogRepository
pub struct PgServiceCatalogRepository {
    pool: PgPool,
}

impl PgServiceCatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceCatalogRepository for PgServiceCatalogRepository {
    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Service>> {
        debug!("Finding {} catalog services", ids.len());

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
            r#"
            SELECT id, name, unit_price, active
            FROM services
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding services: {}", e);
            AppError::Database(format!("Failed to find services: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
            "SELECT id, name, unit_price, active FROM services WHERE active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing services: {}", e);
            AppError::Database(format!("Failed to list services: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    name: String,
    unit_price: Decimal,
    active: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            unit_price: row.unit_price,
            active: row.active,
        }
    }
}
