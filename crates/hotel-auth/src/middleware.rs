//! Actix-web request extractors for authenticated staff

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hotel_core::error::AppError;
use hotel_core::models::StaffRole;
use tracing::{debug, warn};
use uuid::Uuid;

/// Extract the access token from the request
///
/// Checks the `Authorization: Bearer` header first, then the
/// `access_token` cookie set by the dashboard.
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie("access_token")
        .map(|cookie| cookie.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_service = req.app_data::<web::Data<JwtService>>().ok_or_else(|| {
        warn!("JwtService not found in app data");
        AppError::Unauthorized("Authentication service not configured".to_string())
    })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token)?;
    let user_id = claims.user_id()?;

    debug!(user_id = %user_id, role = %claims.role, "Staff authenticated");

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email.clone(),
        role: claims.role,
        claims,
    })
}

/// Authenticated staff member
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use hotel_auth::middleware::AuthenticatedUser;
///
/// async fn handler(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().body(user.user_id.to_string())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Staff profile id
    pub user_id: Uuid,

    pub email: Option<String>,

    pub role: StaffRole,

    /// Full claims from the token
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|e| {
            warn!(error = %e, "Authentication failed");
            e.into()
        }))
    }
}

/// Admin extractor
///
/// Rejects authenticated non-admin staff with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl std::ops::Deref for AdminUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_user = match AuthenticatedUser::from_request(req, payload).into_inner() {
            Ok(user) => user,
            Err(e) => return ready(Err(e)),
        };

        if !auth_user.is_admin() {
            warn!(
                user_id = %auth_user.user_id,
                role = %auth_user.role,
                "Staff attempted admin action without privileges"
            );
            return ready(Err(AppError::Forbidden.into()));
        }

        ready(Ok(AdminUser(auth_user)))
    }
}
