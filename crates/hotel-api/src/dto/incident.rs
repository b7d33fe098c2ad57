//! Incident DTOs

use hotel_services::ReportIncident;
use serde::Deserialize;
use validator::Validate;

/// Maintenance incident report
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IncidentRequest {
    /// Room number or area
    #[validate(length(min = 1, max = 100, message = "La ubicación es obligatoria"))]
    pub location: String,

    #[validate(length(min = 1, max = 2000, message = "La descripción es obligatoria"))]
    pub description: String,
}

impl IncidentRequest {
    pub fn into_report(self, reported_by: Option<String>) -> ReportIncident {
        ReportIncident {
            location: self.location,
            description: self.description,
            reported_by,
        }
    }
}
