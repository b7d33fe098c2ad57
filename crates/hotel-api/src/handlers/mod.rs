//! HTTP request handlers

pub mod guest;
pub mod health;
pub mod incident;
pub mod pricing;
pub mod reservation;
pub mod room;

use actix_web::web;

pub use guest::configure as configure_guests;
pub use incident::configure as configure_incidents;
pub use pricing::configure as configure_pricing;
pub use reservation::configure as configure_reservations;
pub use room::configure as configure_rooms;

/// Mount every route under `/api/v1`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health_check))
            .configure(configure_reservations)
            .configure(configure_guests)
            .configure(configure_rooms)
            .configure(configure_pricing)
            .configure(configure_incidents),
    );
}
