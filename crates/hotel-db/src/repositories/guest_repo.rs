//! Guest repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotel_core::{
    models::{DocumentType, Guest, GuestPatch, NewGuest},
    traits::GuestRepository,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// PostgreSQL implementation of GuestRepository
pub struct PgGuestRepository {
    pool: PgPool,
}

impl PgGuestRepository {
    /// Create a new guest repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse document type from string
    fn parse_document_type(s: &str) -> DocumentType {
        DocumentType::from_str(s).unwrap_or(DocumentType::Rut)
    }

    /// Accompanying guests linked to a reservation
    #[instrument(skip(self))]
    pub async fn find_companions(&self, reservation_id: Uuid) -> AppResult<Vec<Guest>> {
        debug!("Finding companions of reservation {}", reservation_id);

        let rows = sqlx::query_as::<sqlx::Postgres, GuestRow>(
            r#"
            SELECT
                g.id, g.document_type, g.document_number,
                g.first_name, g.last_name, g.country, g.city, g.birth_date,
                g.email, g.phone, g.created_at, g.updated_at
            FROM reservation_guests rg
            JOIN guests g ON g.id = rg.guest_id
            WHERE rg.reservation_id = $1
            ORDER BY g.last_name, g.first_name
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding companions: {}", e);
            AppError::Database(format!("Failed to find companions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl GuestRepository for PgGuestRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Guest>> {
        debug!("Finding guest by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, GuestRow>(
            r#"
            SELECT
                id, document_type, document_number,
                first_name, last_name, country, city, birth_date,
                email, phone, created_at, updated_at
            FROM guests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding guest {}: {}", id, e);
            AppError::Database(format!("Failed to find guest: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_document(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> AppResult<Option<Guest>> {
        let number = document_type.normalize_number(document_number);
        debug!("Finding guest by document: {} {}", document_type, number);

        let result = sqlx::query_as::<sqlx::Postgres, GuestRow>(
            r#"
            SELECT
                id, document_type, document_number,
                first_name, last_name, country, city, birth_date,
                email, phone, created_at, updated_at
            FROM guests
            WHERE document_type = $1 AND document_number = $2
            "#,
        )
        .bind(document_type.to_string())
        .bind(&number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding guest by document: {}", e);
            AppError::Database(format!("Failed to find guest: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, guest), fields(document_type = %guest.document_type))]
    async fn create(&self, guest: &NewGuest) -> AppResult<Guest> {
        let number = guest.document_type.normalize_number(&guest.document_number);
        debug!("Creating guest with document {}", number);

        let row = sqlx::query_as::<sqlx::Postgres, GuestRow>(
            r#"
            INSERT INTO guests (
                document_type, document_number,
                first_name, last_name, country, city, birth_date,
                email, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, document_type, document_number,
                first_name, last_name, country, city, birth_date,
                email, phone, created_at, updated_at
            "#,
        )
        .bind(guest.document_type.to_string())
        .bind(&number)
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(&guest.country)
        .bind(&guest.city)
        .bind(guest.birth_date)
        .bind(&guest.email)
        .bind(&guest.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Duplicate guest document {} {}", guest.document_type, number);
                AppError::DuplicateDocument {
                    document_type: guest.document_type.to_string(),
                    document_number: number.clone(),
                }
            } else {
                error!("Database error creating guest: {}", e);
                AppError::Database(format!("Failed to create guest: {}", e))
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: Uuid, patch: &GuestPatch) -> AppResult<Guest> {
        debug!("Updating guest: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, GuestRow>(
            r#"
            UPDATE guests
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                country = COALESCE($4, country),
                city = COALESCE($5, city),
                birth_date = COALESCE($6, birth_date),
                email = COALESCE($7, email),
                phone = COALESCE($8, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, document_type, document_number,
                first_name, last_name, country, city, birth_date,
                email, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.country)
        .bind(&patch.city)
        .bind(patch.birth_date)
        .bind(&patch.email)
        .bind(&patch.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating guest {}: {}", id, e);
            AppError::Database(format!("Failed to update guest: {}", e))
        })?
        .ok_or_else(|| AppError::GuestNotFound(id.to_string()))?;

        Ok(row.into())
    }
}

/// True if the error is a PostgreSQL unique constraint violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct GuestRow {
    id: Uuid,
    document_type: String,
    document_number: String,
    first_name: String,
    last_name: String,
    country: Option<String>,
    city: Option<String>,
    birth_date: Option<NaiveDate>,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Self {
            id: row.id,
            document_type: PgGuestRepository::parse_document_type(&row.document_type),
            document_number: row.document_number,
            first_name: row.first_name,
            last_name: row.last_name,
            country: row.country,
            city: row.city,
            birth_date: row.birth_date,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_type() {
        assert_eq!(
            PgGuestRepository::parse_document_type("Pasaporte"),
            DocumentType::Pasaporte
        );
        assert_eq!(
            PgGuestRepository::parse_document_type("RUT"),
            DocumentType::Rut
        );
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
