//! Maintenance incident handlers

use crate::dto::{validate_request, ApiResponse, IncidentRequest};
use actix_web::{web, HttpResponse};
use hotel_auth::AuthenticatedUser;
use hotel_core::AppError;
use hotel_services::IncidentService;
use tracing::instrument;

/// Report an incident to maintenance
///
/// POST /api/v1/incidents
#[instrument(skip(service, user, req), fields(user_id = %user.user_id))]
pub async fn report_incident(
    service: web::Data<IncidentService>,
    user: AuthenticatedUser,
    req: web::Json<IncidentRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Incident")?;

    let reported_by = user.email.clone().or_else(|| Some(user.user_id.to_string()));
    let incident = service.report(req.into_inner().into_report(reported_by)).await?;

    let message = if incident.notified {
        "Incidente reportado a mantención"
    } else {
        "Incidente registrado, no se pudo notificar a mantención"
    };

    Ok(HttpResponse::Created().json(ApiResponse::with_message(incident, message)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/incidents", web::post().to(report_incident));
}
