//! Reservation repository implementation
//!
//! Every multi-row write (a booking, a status transition that implies a room
//! status change) runs inside a single transaction.

use super::guest_repo::{is_unique_violation, PgGuestRepository};
use super::room_repo::PgRoomRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotel_core::{
    models::{
        NewBooking, NewReservation, NewServiceLine, PaymentStatus, PaymentType, Profile,
        Reservation, ReservationDetail, ReservationPatch, ReservationStatus, RoomStatus,
        ServiceLineDetail, StaffRole,
    },
    traits::{GuestRepository, ReservationRepository, RoomRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = r#"
    id, booking_id, reservation_code, room_id, guest_id,
    check_in, check_out, original_check_in, nights,
    total, subtotal_net, iva_amount, discount_percent,
    status, payment_status, payment_type, deposit_amount, refund_amount,
    notes, created_by, paid_at, refunded_at, cancelled_at,
    created_at, updated_at
"#;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse reservation status from string
    fn parse_status(s: &str) -> ReservationStatus {
        ReservationStatus::from_str(s).unwrap_or(ReservationStatus::Pendiente)
    }

    /// Parse payment status from string
    fn parse_payment_status(s: &str) -> PaymentStatus {
        PaymentStatus::from_str(s).unwrap_or(PaymentStatus::Pending)
    }

    /// Parse payment type from string
    fn parse_payment_type(s: &str) -> PaymentType {
        PaymentType::from_str(s).unwrap_or(PaymentType::Partial)
    }

    async fn insert_booking_header<'e, E: PgExecutor<'e>>(
        executor: E,
        booking_id: Uuid,
        code: &str,
        created_by: Option<Uuid>,
        if_missing: bool,
    ) -> Result<(), sqlx::Error> {
        let sql = if if_missing {
            "INSERT INTO bookings (id, code, created_by) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"
        } else {
            "INSERT INTO bookings (id, code, created_by) VALUES ($1, $2, $3)"
        };

        sqlx::query(sql)
            .bind(booking_id)
            .bind(code)
            .bind(created_by)
            .execute(executor)
            .await?;

        Ok(())
    }

    async fn insert_reservation<'e, E: PgExecutor<'e>>(
        executor: E,
        r: &NewReservation,
    ) -> Result<ReservationRow, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO reservations (
                id, booking_id, reservation_code, room_id, guest_id,
                check_in, check_out, nights,
                total, subtotal_net, iva_amount, discount_percent,
                status, payment_status, payment_type, deposit_amount,
                notes, created_by, paid_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );

        sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(r.id)
            .bind(r.booking_id)
            .bind(&r.reservation_code)
            .bind(r.room_id)
            .bind(r.guest_id)
            .bind(r.check_in)
            .bind(r.check_out)
            .bind(r.nights)
            .bind(r.total)
            .bind(r.subtotal_net)
            .bind(r.iva_amount)
            .bind(r.discount_percent)
            .bind(r.status.to_string())
            .bind(r.payment_status.to_string())
            .bind(r.payment_type.to_string())
            .bind(r.deposit_amount)
            .bind(&r.notes)
            .bind(r.created_by)
            .bind(r.paid_at)
            .fetch_one(executor)
            .await
    }

    async fn insert_service_line<'e, E: PgExecutor<'e>>(
        executor: E,
        line: &NewServiceLine,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO reservation_services (reservation_id, service_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(line.reservation_id)
        .bind(line.service_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(executor)
        .await?;

        Ok(())
    }

    async fn apply_patch<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        patch: &ReservationPatch,
    ) -> Result<Option<ReservationRow>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE reservations
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                check_in = COALESCE($4, check_in),
                original_check_in = COALESCE($5, original_check_in),
                deposit_amount = COALESCE($6, deposit_amount),
                refund_amount = COALESCE($7, refund_amount),
                notes = COALESCE($8, notes),
                paid_at = COALESCE($9, paid_at),
                refunded_at = COALESCE($10, refunded_at),
                cancelled_at = COALESCE($11, cancelled_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );

        sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(id)
            .bind(patch.status.map(|s| s.to_string()))
            .bind(patch.payment_status.map(|s| s.to_string()))
            .bind(patch.check_in)
            .bind(patch.original_check_in)
            .bind(patch.deposit_amount)
            .bind(patch.refund_amount)
            .bind(&patch.notes)
            .bind(patch.paid_at)
            .bind(patch.refunded_at)
            .bind(patch.cancelled_at)
            .fetch_optional(executor)
            .await
    }

    async fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<sqlx::Postgres, ProfileRow>(
            "SELECT id, full_name, role, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding profile {}: {}", id, e);
            AppError::Database(format!("Failed to find profile: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    async fn find_service_lines(&self, reservation_id: Uuid) -> AppResult<Vec<ServiceLineDetail>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ServiceLineRow>(
            r#"
            SELECT rs.id, rs.service_id, s.name AS service_name, rs.quantity, rs.unit_price
            FROM reservation_services rs
            JOIN services s ON s.id = rs.service_id
            WHERE rs.reservation_id = $1
            ORDER BY rs.created_at, s.name
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service lines: {}", e);
            AppError::Database(format!("Failed to find service lines: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn select_many(&self, where_clause: &str, bind: Uuid) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations {}",
            RESERVATION_COLUMNS, where_clause
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn begin_failed(e: sqlx::Error) -> AppError {
    error!("Failed to start transaction: {}", e);
    AppError::Transaction(format!("Failed to start transaction: {}", e))
}

fn commit_failed(e: sqlx::Error) -> AppError {
    error!("Failed to commit transaction: {}", e);
    AppError::Transaction(format!("Failed to commit transaction: {}", e))
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self, reservation), fields(code = %reservation.reservation_code))]
    async fn create(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        debug!("Creating reservation {}", reservation.reservation_code);

        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        Self::insert_booking_header(
            &mut *tx,
            reservation.booking_id,
            &reservation.reservation_code,
            reservation.created_by,
            true,
        )
        .await
        .map_err(|e| {
            error!("Database error creating booking header: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        let row = Self::insert_reservation(&mut *tx, reservation)
            .await
            .map_err(|e| {
                error!("Database error creating reservation: {}", e);
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "Reservation code {} already exists",
                        reservation.reservation_code
                    ))
                } else {
                    AppError::Database(format!("Failed to create reservation: {}", e))
                }
            })?;

        tx.commit().await.map_err(commit_failed)?;

        Ok(row.into())
    }

    #[instrument(skip(self, lines))]
    async fn add_services(&self, lines: &[NewServiceLine]) -> AppResult<u64> {
        debug!("Adding {} service lines", lines.len());

        if lines.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        for line in lines {
            Self::insert_service_line(&mut *tx, line)
                .await
                .map_err(|e| {
                    error!(
                        "Database error adding service {} to reservation {}: {}",
                        line.service_id, line.reservation_id, e
                    );
                    AppError::Database(format!("Failed to add service line: {}", e))
                })?;
        }

        tx.commit().await.map_err(commit_failed)?;

        Ok(lines.len() as u64)
    }

    #[instrument(skip(self, booking), fields(code = %booking.code, rooms = booking.reservations.len()))]
    async fn create_booking(&self, booking: &NewBooking) -> AppResult<Vec<Reservation>> {
        debug!("Creating booking {}", booking.code);

        let primary_id = booking
            .reservations
            .first()
            .map(|r| r.id)
            .ok_or_else(|| AppError::InvalidInput("Booking without rooms".to_string()))?;

        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        Self::insert_booking_header(&mut *tx, booking.id, &booking.code, booking.created_by, false)
            .await
            .map_err(|e| {
                error!("Database error creating booking {}: {}", booking.code, e);
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("Booking code {} already exists", booking.code))
                } else {
                    AppError::Database(format!("Failed to create booking: {}", e))
                }
            })?;

        let mut created = Vec::with_capacity(booking.reservations.len());
        for reservation in &booking.reservations {
            let row = Self::insert_reservation(&mut *tx, reservation)
                .await
                .map_err(|e| {
                    error!(
                        "Database error creating reservation {}: {}",
                        reservation.reservation_code, e
                    );
                    AppError::Database(format!("Failed to create reservation: {}", e))
                })?;
            created.push(Reservation::from(row));
        }

        for guest_id in &booking.companions {
            sqlx::query(
                r#"
                INSERT INTO reservation_guests (reservation_id, guest_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(primary_id)
            .bind(guest_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error linking companion {}: {}", guest_id, e);
                AppError::Database(format!("Failed to link companion: {}", e))
            })?;
        }

        for line in &booking.services {
            Self::insert_service_line(&mut *tx, line)
                .await
                .map_err(|e| {
                    error!("Database error adding service {}: {}", line.service_id, e);
                    AppError::Database(format!("Failed to add service line: {}", e))
                })?;
        }

        tx.commit().await.map_err(commit_failed)?;

        info!(
            "Booking {} stored with {} reservation(s)",
            booking.code,
            created.len()
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let sql = format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_detail(&self, id: Uuid) -> AppResult<Option<ReservationDetail>> {
        let reservation = match self.find_by_id(id).await? {
            Some(r) => r,
            None => return Ok(None),
        };

        let guests = PgGuestRepository::new(self.pool.clone());
        let guest = guests
            .find_by_id(reservation.guest_id)
            .await?
            .ok_or_else(|| AppError::GuestNotFound(reservation.guest_id.to_string()))?;

        let room = PgRoomRepository::new(self.pool.clone())
            .find_by_id(reservation.room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(reservation.room_id.to_string()))?;

        let creator = match reservation.created_by {
            Some(profile_id) => self.find_profile(profile_id).await?,
            None => None,
        };

        let services = self.find_service_lines(reservation.id).await?;
        let companions = guests.find_companions(reservation.id).await?;

        Ok(Some(ReservationDetail {
            reservation,
            guest,
            room,
            creator,
            services,
            companions,
        }))
    }

    #[instrument(skip(self))]
    async fn find_by_guest_id(&self, guest_id: Uuid) -> AppResult<Vec<Reservation>> {
        debug!("Finding reservations of guest {}", guest_id);
        self.select_many(
            "WHERE guest_id = $1 ORDER BY check_in DESC, reservation_code",
            guest_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Vec<Reservation>> {
        debug!("Finding reservations of booking {}", booking_id);
        self.select_many(
            "WHERE booking_id = $1 ORDER BY LENGTH(reservation_code), reservation_code",
            booking_id,
        )
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: Uuid, patch: &ReservationPatch) -> AppResult<Reservation> {
        debug!("Updating reservation: {}", id);

        let row = Self::apply_patch(&self.pool, id, patch)
            .await
            .map_err(|e| {
                error!("Database error updating reservation {}: {}", id, e);
                AppError::Database(format!("Failed to update reservation: {}", e))
            })?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self, patch))]
    async fn update_with_room_status(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        room_id: i32,
        room_status: RoomStatus,
    ) -> AppResult<Reservation> {
        debug!(
            "Updating reservation {} and setting room {} to {}",
            id, room_id, room_status
        );

        let mut tx = self.pool.begin().await.map_err(begin_failed)?;

        let row = Self::apply_patch(&mut *tx, id, patch)
            .await
            .map_err(|e| {
                error!("Database error updating reservation {}: {}", id, e);
                AppError::Database(format!("Failed to update reservation: {}", e))
            })?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

        let result = sqlx::query("UPDATE rooms SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(room_id)
            .bind(room_status.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error updating room {} status: {}", room_id, e);
                AppError::Database(format!("Failed to update room status: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::RoomNotFound(room_id.to_string()));
        }

        tx.commit().await.map_err(commit_failed)?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_active_by_room_id(
        &self,
        room_id: i32,
        today: NaiveDate,
    ) -> AppResult<Option<Reservation>> {
        debug!("Finding active reservation of room {} on {}", room_id, today);

        // 'Check-in' < 'Confirmada' < 'Pendiente': an ongoing stay wins.
        let sql = format!(
            r#"
            SELECT {}
            FROM reservations
            WHERE room_id = $1
              AND check_in <= $2
              AND check_out >= $2
              AND status NOT IN ('Cancelada', 'Finalizada')
            ORDER BY status ASC, check_in ASC
            LIMIT 1
            "#,
            RESERVATION_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(room_id)
            .bind(today)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding active reservation: {}", e);
                AppError::Database(format!("Failed to find active reservation: {}", e))
            })?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    booking_id: Uuid,
    reservation_code: String,
    room_id: i32,
    guest_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    original_check_in: Option<NaiveDate>,
    nights: i32,
    total: Decimal,
    subtotal_net: Decimal,
    iva_amount: Decimal,
    discount_percent: Decimal,
    status: String,
    payment_status: String,
    payment_type: String,
    deposit_amount: Decimal,
    refund_amount: Option<Decimal>,
    notes: Option<String>,
    created_by: Option<Uuid>,
    paid_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            reservation_code: row.reservation_code,
            room_id: row.room_id,
            guest_id: row.guest_id,
            check_in: row.check_in,
            check_out: row.check_out,
            original_check_in: row.original_check_in,
            nights: row.nights,
            total: row.total,
            subtotal_net: row.subtotal_net,
            iva_amount: row.iva_amount,
            discount_percent: row.discount_percent,
            status: PgReservationRepository::parse_status(&row.status),
            payment_status: PgReservationRepository::parse_payment_status(&row.payment_status),
            payment_type: PgReservationRepository::parse_payment_type(&row.payment_type),
            deposit_amount: row.deposit_amount,
            refund_amount: row.refund_amount,
            notes: row.notes,
            created_by: row.created_by,
            paid_at: row.paid_at,
            refunded_at: row.refunded_at,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            role: StaffRole::from_str(&row.role).unwrap_or(StaffRole::Receptionist),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceLineRow {
    id: Uuid,
    service_id: i32,
    service_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<ServiceLineRow> for ServiceLineDetail {
    fn from(row: ServiceLineRow) -> Self {
        Self {
            id: row.id,
            service_id: row.service_id,
            service_name: row.service_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgReservationRepository::parse_status("Check-in"),
            ReservationStatus::CheckIn
        );
        assert_eq!(
            PgReservationRepository::parse_status("Cancelada"),
            ReservationStatus::Cancelada
        );
    }

    #[test]
    fn test_parse_payment_fields() {
        assert_eq!(
            PgReservationRepository::parse_payment_status("refund_pending"),
            PaymentStatus::RefundPending
        );
        assert_eq!(
            PgReservationRepository::parse_payment_type("full"),
            PaymentType::Full
        );
    }

    #[test]
    fn test_profile_row_unknown_role_defaults_to_receptionist() {
        let profile: Profile = ProfileRow {
            id: Uuid::new_v4(),
            full_name: "Carla Muñoz".to_string(),
            role: "gerente".to_string(),
            created_at: Utc::now(),
        }
        .into();
        assert_eq!(profile.role, StaffRole::Receptionist);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_booking_rolls_back_on_failure() {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/hotel".to_string());
        let pool = crate::create_pool(&database_url, Some(2)).await.unwrap();
        crate::run_migrations(&pool).await.unwrap();
        let repo = PgReservationRepository::new(pool);

        // Unknown room id violates the foreign key on the second row.
        let booking_id = Uuid::new_v4();
        let code = format!("T-{}", &booking_id.simple().to_string()[..8]);
        let make = |index: usize, room_id: i32| NewReservation {
            id: Uuid::new_v4(),
            booking_id,
            reservation_code: Reservation::code_for(&code, index),
            room_id,
            guest_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2030, 1, 3).unwrap(),
            nights: 2,
            total: Decimal::ZERO,
            subtotal_net: Decimal::ZERO,
            iva_amount: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            status: ReservationStatus::Pendiente,
            payment_status: PaymentStatus::Partial,
            payment_type: PaymentType::Partial,
            deposit_amount: Decimal::ZERO,
            notes: None,
            created_by: None,
            paid_at: None,
        };
        let booking = NewBooking {
            id: booking_id,
            code: code.clone(),
            created_by: None,
            reservations: vec![make(0, -1), make(1, -2)],
            services: vec![],
            companions: vec![],
        };

        assert!(repo.create_booking(&booking).await.is_err());
        assert!(repo.find_by_booking(booking_id).await.unwrap().is_empty());
    }
}
