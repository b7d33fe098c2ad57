//! Room DTOs

use chrono::NaiveDate;
use hotel_core::models::RoomStatus;
use hotel_core::AppError;
use serde::Deserialize;
use validator::Validate;

/// `GET /rooms` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomListQuery {
    /// `Disponible` or `Ocupada`
    pub status: Option<String>,
}

impl RoomListQuery {
    pub fn status(&self) -> Result<Option<RoomStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => RoomStatus::from_str(s)
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("Estado de habitación inválido: {}", s))),
        }
    }
}

/// `GET /rooms/available` query
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Minimum number of guests the room must hold
    #[validate(range(min = 1, max = 20))]
    pub capacity: Option<i32>,
}
