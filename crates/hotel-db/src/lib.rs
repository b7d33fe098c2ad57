//! Hotel back-office database layer
//!
//! PostgreSQL access for the reservation flow:
//!
//! - Connection pool management and embedded migrations
//! - sqlx implementations of the repository traits from `hotel-core`
//! - Transactional booking creation and reservation/room status writes

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use hotel_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
