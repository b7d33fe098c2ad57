//! Hotel back-office core library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the hotel back-office. It includes:
//!
//! - Domain models (Guest, Room, Reservation, service lines, incidents)
//! - Repository traits implemented by the db crate
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
