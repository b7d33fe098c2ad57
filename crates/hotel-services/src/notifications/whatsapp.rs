//! WhatsApp Cloud API client

use super::{ensure_success, http_client, transport_error, NotificationError, WhatsAppSender};
use async_trait::async_trait;
use hotel_core::config::WhatsAppConfig;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

pub struct WhatsAppCloudClient {
    http_client: Client,
    messages_url: String,
    access_token: String,
    timeout_secs: u64,
}

impl WhatsAppCloudClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, NotificationError> {
        if config.access_token.is_empty() || config.phone_number_id.is_empty() {
            return Err(NotificationError::Config(
                "WhatsApp access token and phone number id are required".to_string(),
            ));
        }

        Ok(Self {
            http_client: http_client(config.timeout_secs)?,
            messages_url: messages_url(&config.api_url, &config.phone_number_id),
            access_token: config.access_token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

fn messages_url(api_url: &str, phone_number_id: &str) -> String {
    format!("{}/{}/messages", api_url.trim_end_matches('/'), phone_number_id)
}

/// Phone numbers go out as digits only, country code included
fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl WhatsAppSender for WhatsAppCloudClient {
    #[instrument(skip(self, body))]
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": normalize_phone(to),
            "type": "text",
            "text": { "body": body },
        });

        let response = self
            .http_client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        ensure_success(response).await?;
        debug!("WhatsApp message accepted");
        Ok(())
    }
}
