//! Maintenance incident reporting
//!
//! Classify a staff report and forward it to the maintenance phone. The
//! flow never fails because a collaborator is down: classification falls
//! back to the default and a failed send is recorded as `notified = false`.

use crate::notifications::{IncidentClassifier, WhatsAppSender};
use chrono::Utc;
use hotel_core::models::{Incident, IncidentClassification};
use hotel_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Incoming report
#[derive(Debug, Clone)]
pub struct ReportIncident {
    pub location: String,
    pub description: String,
    pub reported_by: Option<String>,
}

pub struct IncidentService {
    classifier: Option<Arc<dyn IncidentClassifier>>,
    whatsapp: Option<Arc<dyn WhatsAppSender>>,
    maintenance_phone: Option<String>,
    hotel_name: String,
}

impl IncidentService {
    pub fn new(hotel_name: impl Into<String>) -> Self {
        Self {
            classifier: None,
            whatsapp: None,
            maintenance_phone: None,
            hotel_name: hotel_name.into(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IncidentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_whatsapp(
        mut self,
        sender: Arc<dyn WhatsAppSender>,
        maintenance_phone: impl Into<String>,
    ) -> Self {
        self.whatsapp = Some(sender);
        self.maintenance_phone = Some(maintenance_phone.into());
        self
    }

    #[instrument(skip(self, report), fields(location = %report.location))]
    pub async fn report(&self, report: ReportIncident) -> AppResult<Incident> {
        let location = report.location.trim();
        let description = report.description.trim();
        if location.is_empty() || description.is_empty() {
            return Err(AppError::Validation(
                "La ubicación y la descripción del incidente son obligatorias".to_string(),
            ));
        }

        let classification = match &self.classifier {
            Some(classifier) => match classifier.classify(location, description).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "Incident classification failed, using defaults");
                    IncidentClassification::default()
                }
            },
            None => IncidentClassification::default(),
        };

        let mut incident = Incident {
            location: location.to_string(),
            description: description.to_string(),
            reported_by: report.reported_by,
            classification,
            notified: false,
            reported_at: Utc::now(),
        };

        if let (Some(sender), Some(phone)) = (&self.whatsapp, &self.maintenance_phone) {
            let message = compose_message(&self.hotel_name, &incident);
            match sender.send_text(phone, &message).await {
                Ok(()) => incident.notified = true,
                Err(e) => warn!(error = %e, "Maintenance notification failed"),
            }
        }

        info!(
            category = %incident.classification.category,
            priority = %incident.classification.priority,
            notified = incident.notified,
            "Incident reported"
        );

        Ok(incident)
    }
}

/// WhatsApp text sent to maintenance
pub fn compose_message(hotel_name: &str, incident: &Incident) -> String {
    let c = &incident.classification;
    let mut message = format!(
        "🔧 {} | Incidente {} (prioridad {})\nUbicación: {}\n{}",
        hotel_name,
        c.category,
        c.priority,
        incident.location,
        c.summary.as_deref().unwrap_or(&incident.description),
    );
    if c.summary.is_some() {
        message.push_str(&format!("\nDetalle: {}", incident.description));
    }
    if let Some(by) = &incident.reported_by {
        message.push_str(&format!("\nReportado por: {}", by));
    }
    message
}
