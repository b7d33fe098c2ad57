//! Guest handlers

use crate::dto::guest::parse_document_type;
use crate::dto::{
    validate_request, ApiResponse, GuestHistoryResponse, GuestLookupQuery, GuestResponse,
    GuestUpdateRequest, ReservationResponse,
};
use actix_web::{web, HttpResponse};
use hotel_auth::AuthenticatedUser;
use hotel_core::AppError;
use hotel_services::PgReservationService;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Find a guest by document, with their reservation history
///
/// GET /api/v1/guests/lookup?document_type=RUT&document_number=12345678-5
#[instrument(skip(service, _user))]
pub async fn lookup_guest(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    query: web::Query<GuestLookupQuery>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*query, "Guest lookup")?;
    let document_type = parse_document_type(&query.document_type)?;

    debug!(document_type = %document_type, "Looking up guest");

    let history = service
        .guest_history(document_type, &query.document_number)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(GuestHistoryResponse::from(history))))
}

/// GET /api/v1/guests/{id}/reservations
#[instrument(skip(service, _user))]
pub async fn guest_reservations(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let rows = service.guest_reservations(path.into_inner()).await?;
    let data: Vec<ReservationResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// PATCH /api/v1/guests/{id}
#[instrument(skip(service, _user, req))]
pub async fn update_guest(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<GuestUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Guest update")?;
    let patch = req.into_inner().into_patch();
    let guest = service.update_guest(path.into_inner(), &patch).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        GuestResponse::from(guest),
        "Huésped actualizado",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/guests")
            .route("/lookup", web::get().to(lookup_guest))
            .route("/{id}", web::patch().to(update_guest))
            .route("/{id}/reservations", web::get().to(guest_reservations)),
    );
}
