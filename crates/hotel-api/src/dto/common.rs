//! Common DTOs used across the API

use hotel_core::AppError;
use serde::Serialize;
use tracing::warn;
use validator::Validate;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Run derive validations, mapping failures to a 400
pub fn validate_request<T: Validate>(req: &T, context: &str) -> Result<(), AppError> {
    req.validate().map_err(|e| {
        warn!("{} validation failed: {}", context, e);
        AppError::Validation(e.to_string())
    })
}
