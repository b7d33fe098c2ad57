//! Room repository implementation
//!
//! Availability is computed from live reservations overlapping the requested
//! stay; the `status` column only reflects whether a stay is in progress.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotel_core::{
    models::{Room, RoomStatus},
    traits::RoomRepository,
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of RoomRepository
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new room repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse room status from string
    fn parse_status(s: &str) -> RoomStatus {
        RoomStatus::from_str(s).unwrap_or(RoomStatus::Disponible)
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Room>> {
        debug!("Finding room by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT id, number, room_type, capacity, base_price, status, created_at, updated_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding room {}: {}", id, e);
            AppError::Database(format!("Failed to find room: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Room>> {
        debug!("Finding {} rooms by id", ids.len());

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT id, number, room_type, capacity, base_price, status, created_at, updated_at
            FROM rooms
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding rooms: {}", e);
            AppError::Database(format!("Failed to find rooms: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: i32, status: RoomStatus) -> AppResult<()> {
        debug!("Setting room {} status to {}", id, status);

        let result = sqlx::query("UPDATE rooms SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating room {} status: {}", id, e);
                AppError::Database(format!("Failed to update room status: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::RoomNotFound(id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<RoomStatus>) -> AppResult<Vec<Room>> {
        debug!("Listing rooms with status filter {:?}", status);

        let rows = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT id, number, room_type, capacity, base_price, status, created_at, updated_at
            FROM rooms
            WHERE ($1::VARCHAR IS NULL OR status = $1)
            ORDER BY number
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing rooms: {}", e);
            AppError::Database(format!("Failed to list rooms: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_available(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: Option<i32>,
    ) -> AppResult<Vec<Room>> {
        debug!(
            "Searching rooms available from {} to {} (capacity >= {:?})",
            check_in, check_out, min_capacity
        );

        // Stays are half-open: a departure on day D frees the room for an arrival on D.
        let rows = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT r.id, r.number, r.room_type, r.capacity, r.base_price, r.status,
                   r.created_at, r.updated_at
            FROM rooms r
            WHERE ($3::INTEGER IS NULL OR r.capacity >= $3)
              AND NOT EXISTS (
                  SELECT 1
                  FROM reservations res
                  WHERE res.room_id = r.id
                    AND res.status IN ('Pendiente', 'Confirmada', 'Check-in')
                    AND res.check_in < $2
                    AND res.check_out > $1
              )
            ORDER BY r.number
            "#,
        )
        .bind(check_in)
        .bind(check_out)
        .bind(min_capacity)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error searching available rooms: {}", e);
            AppError::Database(format!("Failed to search available rooms: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i32,
    number: String,
    room_type: String,
    capacity: i32,
    base_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            number: row.number,
            room_type: row.room_type,
            capacity: row.capacity,
            base_price: row.base_price,
            status: PgRoomRepository::parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(PgRoomRepository::parse_status("Ocupada"), RoomStatus::Ocupada);
        assert_eq!(
            PgRoomRepository::parse_status("Disponible"),
            RoomStatus::Disponible
        );
        assert_eq!(PgRoomRepository::parse_status("???"), RoomStatus::Disponible);
    }
}
