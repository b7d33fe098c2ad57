//! Pricing and service catalog handlers

use crate::dto::{ApiResponse, BreakdownQuery};
use actix_web::{web, HttpResponse};
use hotel_auth::AuthenticatedUser;
use hotel_core::AppError;
use hotel_services::pricing::{apply_discount, price_breakdown};
use hotel_services::PgReservationService;
use rust_decimal::Decimal;
use tracing::instrument;

/// Net/IVA split of a display price
///
/// GET /api/v1/pricing/breakdown?amount=26000&iva=19&discount=10
#[instrument(skip(service, _user))]
pub async fn get_breakdown(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
    query: web::Query<BreakdownQuery>,
) -> Result<HttpResponse, AppError> {
    if query.amount < Decimal::ZERO {
        return Err(AppError::Validation(
            "El monto no puede ser negativo".to_string(),
        ));
    }
    if let Some(iva) = query.iva {
        if iva < Decimal::ZERO || iva > Decimal::ONE_HUNDRED {
            return Err(AppError::Validation(
                "El IVA debe estar entre 0 y 100".to_string(),
            ));
        }
    }

    let amount = match query.discount {
        Some(discount) => apply_discount(query.amount, discount),
        None => query.amount,
    };
    let iva = query.iva.unwrap_or(service.settings().iva_percent);

    Ok(HttpResponse::Ok().json(ApiResponse::success(price_breakdown(amount, iva))))
}

/// Active add-on services
///
/// GET /api/v1/services
#[instrument(skip(service, _user))]
pub async fn list_services(
    service: web::Data<PgReservationService>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let services = service.list_services().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(services)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/pricing/breakdown", web::get().to(get_breakdown))
        .route("/services", web::get().to(list_services));
}
