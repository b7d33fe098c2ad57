//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in
//! hotel-core, using sqlx for PostgreSQL access.

pub mod guest_repo;
pub mod reservation_repo;
pub mod room_repo;
pub mod service_repo;

pub use guest_repo::PgGuestRepository;
pub use reservation_repo::PgReservationRepository;
pub use room_repo::PgRoomRepository;
pub use service_repo::PgServiceCatalogRepository;
