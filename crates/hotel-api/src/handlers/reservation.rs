//! Reservation handlers
//!
//! Booking creation and the lifecycle transitions: cancel, check-in,
//! check-out, payment settlement and refunds.

use crate::dto::{
    validate_request, ApiResponse, BookingResponse, CreateReservationRequest, RefundRequest,
    ReservationDetailResponse, ReservationResponse,
};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use hotel_auth::{AdminUser, AuthenticatedUser};
use hotel_core::AppError;
use hotel_services::notifications::email::spawn_confirmation;
use hotel_services::PgReservationService;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Create a booking
///
/// POST /api/v1/reservations
#[instrument(skip(service, state, user, req), fields(user_id = %user.user_id))]
pub async fn create_reservation(
    service: web::Data<PgReservationService>,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*req, "Reservation")?;

    let params = req.into_inner().into_params(user.user_id)?;
    let confirmation = service.create_reservation(params).await?;

    match &state.email {
        Some(sender) => spawn_confirmation(sender.clone(), &confirmation, &state.hotel),
        None => debug!("Email provider not configured, no confirmation sent"),
    }

    info!(code = %confirmation.code, "Booking created via API");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        BookingResponse::from(confirmation),
        "Reserva creada",
    )))
}

/// Reservation detail
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(service, _user))]
pub async fn get_reservation(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let detail = service.get_reservation(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ReservationDetailResponse::from(
        detail,
    ))))
}

/// Sibling rows of a booking
///
/// GET /api/v1/bookings/{id}/reservations
#[instrument(skip(service, _user))]
pub async fn get_booking_rows(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let rows = service.booking_rows(path.into_inner()).await?;
    let data: Vec<ReservationResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// POST /api/v1/reservations/{id}/cancel
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn cancel_reservation(
    service: web::Data<PgReservationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation = service.cancel_reservation(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Reserva cancelada",
    )))
}

/// POST /api/v1/reservations/{id}/check-in
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn check_in(
    service: web::Data<PgReservationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation = service.perform_check_in(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Check-in realizado",
    )))
}

/// POST /api/v1/reservations/{id}/check-out
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn check_out(
    service: web::Data<PgReservationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation = service.perform_check_out(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Check-out realizado",
    )))
}

/// POST /api/v1/reservations/{id}/finalize-payment
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn finalize_payment(
    service: web::Data<PgReservationService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation = service.finalize_payment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Pago registrado",
    )))
}

/// Record a refund (administrators only)
///
/// POST /api/v1/reservations/{id}/refund
#[instrument(skip(service, admin, req), fields(user_id = %admin.user_id))]
pub async fn mark_refunded(
    service: web::Data<PgReservationService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<RefundRequest>,
) -> Result<HttpResponse, AppError> {
    let reservation = service
        .mark_refunded(path.into_inner(), req.amount)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Devolución registrada",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}/cancel", web::post().to(cancel_reservation))
            .route("/{id}/check-in", web::post().to(check_in))
            .route("/{id}/check-out", web::post().to(check_out))
            .route("/{id}/finalize-payment", web::post().to(finalize_payment))
            .route("/{id}/refund", web::post().to(mark_refunded)),
    )
    .route(
        "/bookings/{id}/reservations",
        web::get().to(get_booking_rows),
    );
}
