//! Room handlers

use crate::dto::{
    validate_request, ApiResponse, AvailabilityQuery, ReservationResponse, RoomListQuery,
};
use actix_web::{web, HttpResponse};
use hotel_auth::AuthenticatedUser;
use hotel_core::AppError;
use hotel_services::PgReservationService;
use tracing::{debug, instrument};

/// GET /api/v1/rooms?status=Disponible
#[instrument(skip(service, _user))]
pub async fn list_rooms(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    query: web::Query<RoomListQuery>,
) -> Result<HttpResponse, AppError> {
    let rooms = service.list_rooms(query.status()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rooms)))
}

/// Rooms free for a stay
///
/// GET /api/v1/rooms/available?check_in=2026-03-10&check_out=2026-03-12&capacity=2
#[instrument(skip(service, _user))]
pub async fn available_rooms(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, AppError> {
    validate_request(&*query, "Availability")?;

    let rooms = service
        .search_availability(query.check_in, query.check_out, query.capacity)
        .await?;
    debug!("{} rooms available", rooms.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(rooms)))
}

/// Stay in progress or due today for a room
///
/// GET /api/v1/rooms/{id}/active-reservation
#[instrument(skip(service, _user))]
pub async fn active_reservation(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let reservation = service
        .active_reservation(path.into_inner())
        .await?
        .map(ReservationResponse::from);
    Ok(HttpResponse::Ok().json(ApiResponse::success(reservation)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rooms")
            .route("", web::get().to(list_rooms))
            .route("/available", web::get().to(available_rooms))
            .route("/{id}/active-reservation", web::get().to(active_reservation)),
    );
}
