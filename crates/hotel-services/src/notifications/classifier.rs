//! LLM-backed incident classifier
//!
//! Sends the report to an OpenAI-compatible chat-completions endpoint and
//! expects a JSON object back. Anything unparsable degrades to the default
//! classification (`otro` / `media`) instead of failing the report.

use super::{ensure_success, http_client, transport_error, IncidentClassifier, NotificationError};
use async_trait::async_trait;
use hotel_core::config::LlmConfig;
use hotel_core::models::{IncidentCategory, IncidentClassification, IncidentPriority};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

const SYSTEM_PROMPT: &str = "Eres el asistente de mantención de un hotel. \
Clasifica el incidente reportado y responde SOLO con un objeto JSON con las claves \
\"categoria\" (electricidad, plomeria, climatizacion, limpieza, mobiliario, seguridad u otro), \
\"prioridad\" (baja, media, alta o urgente) y \"resumen\" (una frase corta en español).";

pub struct LlmIncidentClassifier {
    http_client: Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl LlmIncidentClassifier {
    pub fn new(config: &LlmConfig) -> Result<Self, NotificationError> {
        if config.api_key.is_empty() {
            return Err(NotificationError::Config("LLM API key is empty".to_string()));
        }

        Ok(Self {
            http_client: http_client(config.timeout_secs)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct RawClassification {
    #[serde(default)]
    categoria: Option<String>,
    #[serde(default)]
    prioridad: Option<String>,
    #[serde(default)]
    resumen: Option<String>,
}

#[async_trait]
impl IncidentClassifier for LlmIncidentClassifier {
    #[instrument(skip(self, description))]
    async fn classify(
        &self,
        location: &str,
        description: &str,
    ) -> Result<IncidentClassification, NotificationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Ubicación: {}\nDescripción: {}", location, description),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let response = ensure_success(response).await?;
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::ParseError(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NotificationError::ParseError("Empty completion".to_string()))?;

        debug!("Classifier answered {} bytes", content.len());
        Ok(parse_classification(&content))
    }
}

/// Parse the model's answer, tolerating code fences and unknown labels
pub fn parse_classification(content: &str) -> IncidentClassification {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let raw: RawClassification = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Unparsable classifier answer, using defaults");
            return IncidentClassification::default();
        }
    };

    IncidentClassification {
        category: raw
            .categoria
            .as_deref()
            .and_then(IncidentCategory::from_str)
            .unwrap_or_default(),
        priority: raw
            .prioridad
            .as_deref()
            .and_then(IncidentPriority::from_str)
            .unwrap_or_default(),
        summary: raw
            .resumen
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let c = parse_classification(
            r#"{"categoria": "plomeria", "prioridad": "alta", "resumen": "Fuga en el baño"}"#,
        );
        assert_eq!(c.category, IncidentCategory::Plomeria);
        assert_eq!(c.priority, IncidentPriority::Alta);
        assert_eq!(c.summary.as_deref(), Some("Fuga en el baño"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let c = parse_classification(
            "```json\n{\"categoria\": \"Electricidad\", \"prioridad\": \"urgente\"}\n```",
        );
        assert_eq!(c.category, IncidentCategory::Electricidad);
        assert_eq!(c.priority, IncidentPriority::Urgente);
        assert_eq!(c.summary, None);
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        let c = parse_classification(r#"{"categoria": "ascensor", "prioridad": "critica"}"#);
        assert_eq!(c.category, IncidentCategory::Otro);
        assert_eq!(c.priority, IncidentPriority::Media);
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(
            parse_classification("No puedo clasificar esto"),
            IncidentClassification::default()
        );
    }
}
