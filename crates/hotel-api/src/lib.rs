//! API layer for the hotel back-office
//!
//! HTTP handlers for reservations, guests, rooms, pricing and incidents.
//! Every route except `/health` requires a staff token.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod state;

pub use dto::ApiResponse;
pub use handlers::configure_routes;
pub use state::AppState;
