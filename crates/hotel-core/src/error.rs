//! Unified error handling for the hotel back-office
//!
//! Every failure in the workspace ends up as an [`AppError`]. Domain errors
//! carry the Spanish message shown to front-desk staff; infrastructure errors
//! carry the underlying driver message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// It implements `ResponseError` so handlers can return it directly.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Authentication Errors ====================
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    // ==================== Business Logic Errors ====================
    #[error("Reserva no encontrada: {0}")]
    ReservationNotFound(String),

    #[error("Huésped no encontrado: {0}")]
    GuestNotFound(String),

    #[error("Habitación no encontrada: {0}")]
    RoomNotFound(String),

    #[error("Ya existe un huésped con documento {document_type} {document_number}")]
    DuplicateDocument {
        document_type: String,
        document_number: String,
    },

    #[error("La reserva tiene un saldo pendiente de {pending}")]
    PendingBalance { pending: String },

    #[error("La reserva {0} ya tiene check-in")]
    AlreadyCheckedIn(String),

    #[error("La habitación {0} está ocupada")]
    RoomOccupied(String),

    #[error("No se puede {action} una reserva en estado {status}")]
    InvalidTransition { action: String, status: String },

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ==================== External Service Errors ====================
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidToken(_) | AppError::TokenExpired | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            AppError::Forbidden => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::ReservationNotFound(_)
            | AppError::GuestNotFound(_)
            | AppError::RoomNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::DuplicateDocument { .. }
            | AppError::PendingBalance { .. }
            | AppError::AlreadyCheckedIn(_)
            | AppError::RoomOccupied(_)
            | AppError::InvalidTransition { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::GuestNotFound(_) => "guest_not_found",
            AppError::RoomNotFound(_) => "room_not_found",
            AppError::DuplicateDocument { .. } => "duplicate_document",
            AppError::PendingBalance { .. } => "pending_balance",
            AppError::AlreadyCheckedIn(_) => "already_checked_in",
            AppError::RoomOccupied(_) => "room_occupied",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::ExternalService(_) => "external_service_error",
        }
    }

    /// True for precondition failures the UI should show verbatim
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            AppError::ReservationNotFound(_)
                | AppError::GuestNotFound(_)
                | AppError::RoomNotFound(_)
                | AppError::DuplicateDocument { .. }
                | AppError::PendingBalance { .. }
                | AppError::AlreadyCheckedIn(_)
                | AppError::RoomOccupied(_)
                | AppError::InvalidTransition { .. }
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Infrastructure details stay in the logs; the dashboard gets a generic banner.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Error interno, intente nuevamente".to_string()
        } else {
            self.to_string()
        };
        let body = json!({
            "error": self.error_code(),
            "message": message,
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
