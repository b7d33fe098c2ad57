//! Access token claims
//!
//! Tokens come from the hosted auth provider: `sub` is the staff member's
//! uuid, `role` the application role stored in the provider's metadata.

use chrono::{Duration, Utc};
use hotel_core::error::AppError;
use hotel_core::models::StaffRole;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (staff profile uuid)
    pub sub: String,

    /// Staff role; provider roles we do not know map to receptionist
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: StaffRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Audience set by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<StaffRole, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(StaffRole::from_str)
        .unwrap_or_default())
}

impl Claims {
    /// Claims for `user_id` valid for `expires_in_secs`
    pub fn with_expiration(user_id: Uuid, role: StaffRole, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: user_id.to_string(),
            role,
            email: None,
            aud: None,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Staff profile id carried in `sub`
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::InvalidToken("Subject is not a valid uuid".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
