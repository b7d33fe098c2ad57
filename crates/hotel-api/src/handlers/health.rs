//! Health check

use actix_web::{web, HttpResponse};
use hotel_db::pool::ping;
use sqlx::PgPool;
use tracing::warn;

/// GET /api/v1/health
pub async fn health_check(pool: web::Data<PgPool>) -> HttpResponse {
    let database_up = ping(pool.get_ref()).await;
    let body = serde_json::json!({
        "status": if database_up { "healthy" } else { "degraded" },
        "database": if database_up { "up" } else { "down" },
        "service": "hotel-backoffice",
        "version": env!("CARGO_PKG_VERSION"),
    });

    if database_up {
        HttpResponse::Ok().json(body)
    } else {
        warn!("Health check: database unreachable");
        HttpResponse::ServiceUnavailable().json(body)
    }
}
