//! Staff authentication for the hotel back-office
//!
//! Staff sign in through the hosted auth provider. This crate validates the
//! HS256 access tokens the provider issues and exposes Actix-web extractors
//! for role-based access control.
//!
//! # Examples
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use hotel_auth::{AdminUser, AuthenticatedUser};
//!
//! async fn front_desk(user: AuthenticatedUser) -> HttpResponse {
//!     HttpResponse::Ok().json(serde_json::json!({ "user_id": user.user_id }))
//! }
//!
//! async fn refunds(admin: AdminUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser};
