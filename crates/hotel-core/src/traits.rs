//! Repository traits
//!
//! Abstractions over persistence used by the reservation service. The
//! PostgreSQL implementations live in `hotel-db`; tests use in-memory fakes.

use crate::error::AppError;
use crate::models::{
    DocumentType, Guest, GuestPatch, NewBooking, NewGuest, NewReservation, NewServiceLine,
    Reservation, ReservationDetail, ReservationPatch, Room, RoomStatus, Service,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Guest repository
#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Guest>, AppError>;

    /// Find guest by identity document; absence is not an error
    async fn find_by_document(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> Result<Option<Guest>, AppError>;

    /// Insert a guest, failing with `DuplicateDocument` if the document exists
    async fn create(&self, guest: &NewGuest) -> Result<Guest, AppError>;

    /// Merge the provided fields into an existing guest
    async fn update(&self, id: Uuid, patch: &GuestPatch) -> Result<Guest, AppError>;
}

/// Room repository
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Room>, AppError>;

    /// Rooms for the given ids, ordered by id; missing ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Room>, AppError>;

    /// Unconditional status write
    async fn update_status(&self, id: i32, status: RoomStatus) -> Result<(), AppError>;

    /// List rooms, optionally filtered by status
    async fn list(&self, status: Option<RoomStatus>) -> Result<Vec<Room>, AppError>;

    /// Rooms without a live reservation overlapping `[check_in, check_out)`
    async fn find_available(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: Option<i32>,
    ) -> Result<Vec<Room>, AppError>;
}

/// Reservation repository
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a single reservation row
    async fn create(&self, reservation: &NewReservation) -> Result<Reservation, AppError>;

    /// Bulk insert service lines, returns the number of rows written
    async fn add_services(&self, lines: &[NewServiceLine]) -> Result<u64, AppError>;

    /// Persist a whole booking atomically, returns the rows in room order
    async fn create_booking(&self, booking: &NewBooking) -> Result<Vec<Reservation>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError>;

    /// Reservation joined with guest, room, creator and service lines
    async fn find_detail(&self, id: Uuid) -> Result<Option<ReservationDetail>, AppError>;

    /// Reservation history of a guest, newest check-in first
    async fn find_by_guest_id(&self, guest_id: Uuid) -> Result<Vec<Reservation>, AppError>;

    /// All rows of a booking ordered by reservation code
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Vec<Reservation>, AppError>;

    async fn update(&self, id: Uuid, patch: &ReservationPatch) -> Result<Reservation, AppError>;

    /// Apply `patch` and write the room status in one transaction
    async fn update_with_room_status(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        room_id: i32,
        room_status: RoomStatus,
    ) -> Result<Reservation, AppError>;

    /// Live reservation of a room covering `today`, if any
    async fn find_active_by_room_id(
        &self,
        room_id: i32,
        today: NaiveDate,
    ) -> Result<Option<Reservation>, AppError>;
}

/// Add-on service catalog
#[async_trait]
pub trait ServiceCatalogRepository: Send + Sync {
    /// Catalog entries for the given ids; missing ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Service>, AppError>;

    async fn list_active(&self) -> Result<Vec<Service>, AppError>;
}
