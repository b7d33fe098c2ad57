//! Room model
//!
//! Inventory units. `status` mirrors whether a stay is in progress and is
//! only written together with the reservation transition that implies it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoomStatus {
    #[default]
    Disponible,
    Ocupada,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Disponible => write!(f, "Disponible"),
            RoomStatus::Ocupada => write!(f, "Ocupada"),
        }
    }
}

impl RoomStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disponible" => Some(RoomStatus::Disponible),
            "ocupada" => Some(RoomStatus::Ocupada),
            _ => None,
        }
    }
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i32,
    /// Door number, e.g. "204"
    pub number: String,
    pub room_type: String,
    pub capacity: i32,
    /// Nightly price, IVA included
    pub base_price: Decimal,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Ocupada
    }

    /// Lodging price for a stay, services and discounts excluded
    pub fn lodging_total(&self, nights: i32) -> Decimal {
        self.base_price * Decimal::from(nights)
    }
}
