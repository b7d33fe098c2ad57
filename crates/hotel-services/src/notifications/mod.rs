//! Notification collaborators
//!
//! Thin HTTP clients for the transactional email API, the WhatsApp Cloud API
//! and an OpenAI-compatible chat-completions endpoint. Each sits behind a
//! trait so callers and tests can substitute them.

pub mod classifier;
pub mod email;
pub mod whatsapp;

use async_trait::async_trait;
use hotel_core::models::IncidentClassification;
use hotel_core::AppError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;

pub use classifier::LlmIncidentClassifier;
pub use email::{EmailMessage, ResendEmailClient};
pub use whatsapp::WhatsAppCloudClient;

/// Errors raised by notification clients
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("HTTP error: status {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

/// Sends rendered emails
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// Sends WhatsApp text messages
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotificationError>;
}

/// Classifies free-text incident reports
#[async_trait]
pub trait IncidentClassifier: Send + Sync {
    async fn classify(
        &self,
        location: &str,
        description: &str,
    ) -> Result<IncidentClassification, NotificationError>;
}

/// Shared reqwest client builder for the collaborators
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client, NotificationError> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| NotificationError::Config(e.to_string()))
}

/// Map a transport error, keeping timeouts distinguishable
pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> NotificationError {
    if e.is_timeout() {
        NotificationError::Timeout(timeout_secs)
    } else {
        NotificationError::Connection(e.to_string())
    }
}

/// Fail on non-2xx responses, keeping the body for the logs
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, NotificationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotificationError::HttpError {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_error_maps_to_external_service() {
        let err: AppError = NotificationError::Timeout(15).into();
        assert!(matches!(err, AppError::ExternalService(_)));
        assert_eq!(err.error_code(), "external_service_error");
    }

    #[test]
    fn test_http_client_builds() {
        assert!(http_client(5).is_ok());
    }
}
