//! Staff profile model
//!
//! Staff accounts live in the hosted auth provider; a profile row only keeps
//! the display name and role keyed by the provider's subject id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Front-desk staff: bookings, check-in/out, payments
    #[default]
    Receptionist,
    /// Hotel administrator, may also record refunds
    Admin,
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Receptionist => write!(f, "receptionist"),
            StaffRole::Admin => write!(f, "admin"),
        }
    }
}

impl StaffRole {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "receptionist" | "recepcionista" | "staff" => Some(StaffRole::Receptionist),
            "admin" | "administrador" => Some(StaffRole::Admin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, StaffRole::Admin)
    }
}

/// Staff profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Subject id issued by the auth provider
    pub id: Uuid,
    pub full_name: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
}
