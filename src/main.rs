//! Hotel back-office server
//!
//! Reservation lifecycle, pricing and maintenance incident API for the
//! front desk.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use hotel_api::{configure_routes, AppState};
use hotel_auth::JwtService;
use hotel_core::config::AppConfig;
use hotel_db::pool::{create_pool, run_migrations};
use hotel_services::notifications::{
    LlmIncidentClassifier, ResendEmailClient, WhatsAppCloudClient,
};
use hotel_services::{IncidentService, PgReservationService};
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// `LOG_FORMAT=json` switches to JSON lines for log shipping.
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hotel_backoffice={0},hotel_api={0},hotel_services={0},hotel_db={0},hotel_auth={0},actix_web=info,sqlx=warn",
            log_level
        ))
    });

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Build the incident service from whichever collaborators are configured
fn build_incident_service(config: &AppConfig) -> IncidentService {
    let mut service = IncidentService::new(config.hotel.name.clone());

    match config.llm.as_ref().map(LlmIncidentClassifier::new) {
        Some(Ok(classifier)) => {
            info!("Incident classifier enabled");
            service = service.with_classifier(Arc::new(classifier));
        }
        Some(Err(e)) => warn!("Incident classifier disabled: {}", e),
        None => info!("No LLM configured, incidents use the default classification"),
    }

    match config.whatsapp.as_ref() {
        Some(wa) => match WhatsAppCloudClient::new(wa) {
            Ok(client) => {
                info!("WhatsApp notifications enabled");
                service = service.with_whatsapp(Arc::new(client), wa.maintenance_phone.clone());
            }
            Err(e) => warn!("WhatsApp notifications disabled: {}", e),
        },
        None => info!("No WhatsApp configured, incidents are not forwarded"),
    }

    service
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!(
        "Starting hotel back-office v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io_error(e)
    })?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .map_err(io_error)?;

    if config.database.run_migrations {
        run_migrations(&pool).await.map_err(io_error)?;
    }

    let jwt_service = JwtService::new(&config.auth.jwt_secret, config.auth.audience.clone());

    let reservation_service =
        PgReservationService::from_pool(pool.clone(), &config.hotel).map_err(io_error)?;
    info!(
        timezone = %config.hotel.timezone,
        iva_percent = config.hotel.iva_percent,
        "Reservation service ready"
    );

    let incident_service = build_incident_service(&config);

    let mut state = AppState::new(config.hotel.clone());
    match config.email.as_ref().map(ResendEmailClient::new) {
        Some(Ok(client)) => {
            info!("Confirmation emails enabled");
            state = state.with_email(Arc::new(client));
        }
        Some(Err(e)) => warn!("Confirmation emails disabled: {}", e),
        None => info!("No email provider configured, confirmations are not sent"),
    }

    let jwt_service = web::Data::new(jwt_service);
    let reservation_service = web::Data::new(reservation_service);
    let incident_service = web::Data::new(incident_service);
    let state = web::Data::new(state);
    let pool = web::Data::new(pool);

    let cors_origins = config.server.cors_origins.clone();
    let workers = config.server.workers.max(1);
    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(pool.clone())
            .app_data(jwt_service.clone())
            .app_data(reservation_service.clone())
            .app_data(incident_service.clone())
            .app_data(state.clone())
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_body",
                        "message": error_message
                    })),
                )
                .into()
            }))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
