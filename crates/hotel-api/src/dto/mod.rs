//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod guest;
pub mod incident;
pub mod pricing;
pub mod reservation;
pub mod room;

pub use common::*;
pub use guest::*;
pub use incident::*;
pub use pricing::*;
pub use reservation::*;
pub use room::*;
