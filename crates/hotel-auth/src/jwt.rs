//! Access token validation
//!
//! Verifies HS256 tokens signed with the secret shared with the auth provider.

use crate::claims::Claims;
use hotel_core::error::AppError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error, warn};

/// JWT Service for token validation
#[derive(Clone)]
pub struct JwtService {
    /// Expected `aud` claim, if any
    audience: Option<String>,

    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    ///
    /// # Examples
    ///
    /// ```
    /// use hotel_auth::JwtService;
    ///
    /// let jwt_service = JwtService::new("shared-secret", Some("authenticated".to_string()));
    /// ```
    pub fn new(secret: &str, audience: Option<String>) -> Self {
        Self {
            audience,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign claims with the shared secret
    ///
    /// Production tokens are issued by the provider; this is used by tests
    /// and local tooling.
    pub fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        let mut claims = claims.clone();
        if claims.aud.is_none() {
            claims.aud = self.audience.clone();
        }

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to create JWT token");
            AppError::InvalidToken(format!("Token creation failed: {}", e))
        })
    }

    /// Validate a token and extract its claims
    ///
    /// # Errors
    ///
    /// - `AppError::TokenExpired` if the token has expired
    /// - `AppError::InvalidToken` for any other validation failure
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    warn!("Token expired");
                    AppError::TokenExpired
                }
                _ => {
                    warn!(error = %e, "Invalid token");
                    AppError::InvalidToken(format!("Token validation failed: {}", e))
                }
            })?;

        let claims = token_data.claims;

        if claims.is_expired() {
            warn!(sub = %claims.sub, "Token expired");
            return Err(AppError::TokenExpired);
        }

        debug!(sub = %claims.sub, role = %claims.role, "Token validated");

        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("audience", &self.audience)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
