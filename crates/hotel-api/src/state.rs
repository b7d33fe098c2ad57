//! Shared handler state that is not a repository or service

use hotel_core::config::HotelConfig;
use hotel_services::notifications::EmailSender;
use std::sync::Arc;

/// Hotel settings and optional collaborators
pub struct AppState {
    pub hotel: HotelConfig,
    /// Confirmation emails are skipped when no provider is configured
    pub email: Option<Arc<dyn EmailSender>>,
}

impl AppState {
    pub fn new(hotel: HotelConfig) -> Self {
        Self { hotel, email: None }
    }

    pub fn with_email(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email = Some(sender);
        self
    }
}
