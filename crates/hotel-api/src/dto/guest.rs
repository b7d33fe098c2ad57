//! Guest DTOs

use super::reservation::ReservationResponse;
use chrono::{DateTime, NaiveDate, Utc};
use hotel_core::models::{DocumentType, Guest, GuestPatch, NewGuest};
use hotel_core::AppError;
use hotel_services::reservation_service::GuestHistory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Guest data as submitted on the booking form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuestRequest {
    /// `RUT` or `Pasaporte`
    pub document_type: String,

    #[validate(length(min = 1, max = 20, message = "El número de documento es obligatorio"))]
    pub document_number: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es obligatorio"))]
    pub last_name: String,

    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

pub(crate) fn parse_document_type(s: &str) -> Result<DocumentType, AppError> {
    DocumentType::from_str(s)
        .ok_or_else(|| AppError::Validation(format!("Tipo de documento inválido: {}", s)))
}

/// Empty strings from the form mean "not provided"
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl GuestRequest {
    pub fn to_new_guest(&self) -> Result<NewGuest, AppError> {
        Ok(NewGuest {
            document_type: parse_document_type(&self.document_type)?,
            document_number: self.document_number.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            country: non_empty(&self.country),
            city: non_empty(&self.city),
            birth_date: self.birth_date,
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
        })
    }
}

/// Partial guest update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GuestUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

impl GuestUpdateRequest {
    pub fn into_patch(self) -> GuestPatch {
        GuestPatch {
            first_name: non_empty(&self.first_name),
            last_name: non_empty(&self.last_name),
            country: non_empty(&self.country),
            city: non_empty(&self.city),
            birth_date: self.birth_date,
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
        }
    }
}

/// `GET /guests/lookup` query
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuestLookupQuery {
    pub document_type: String,
    #[validate(length(min = 1, max = 20))]
    pub document_number: String,
}

/// Guest response
#[derive(Debug, Clone, Serialize)]
pub struct GuestResponse {
    pub id: Uuid,
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Guest> for GuestResponse {
    fn from(guest: Guest) -> Self {
        Self {
            full_name: guest.full_name(),
            id: guest.id,
            document_type: guest.document_type,
            document_number: guest.document_number,
            first_name: guest.first_name,
            last_name: guest.last_name,
            country: guest.country,
            city: guest.city,
            birth_date: guest.birth_date,
            email: guest.email,
            phone: guest.phone,
            created_at: guest.created_at,
        }
    }
}

/// Guest lookup response, reservations newest first
#[derive(Debug, Clone, Serialize)]
pub struct GuestHistoryResponse {
    pub guest: GuestResponse,
    pub reservations: Vec<ReservationResponse>,
}

impl From<GuestHistory> for GuestHistoryResponse {
    fn from(history: GuestHistory) -> Self {
        Self {
            guest: history.guest.into(),
            reservations: history.reservations.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GuestRequest {
        GuestRequest {
            document_type: "rut".to_string(),
            document_number: " 12.345.678-5 ".to_string(),
            first_name: "Valentina".to_string(),
            last_name: "Rojas".to_string(),
            country: Some("Chile".to_string()),
            city: Some("".to_string()),
            birth_date: None,
            email: Some("valentina@example.cl".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_guest_request_validation() {
        assert!(request().validate().is_ok());

        let mut bad_email = request();
        bad_email.email = Some("no-es-email".to_string());
        assert!(bad_email.validate().is_err());

        let mut no_name = request();
        no_name.first_name = String::new();
        assert!(no_name.validate().is_err());
    }

    #[test]
    fn test_to_new_guest() {
        let guest = request().to_new_guest().unwrap();
        assert_eq!(guest.document_type, DocumentType::Rut);
        assert_eq!(guest.document_number, "12.345.678-5");
        assert_eq!(guest.city, None);

        let mut unknown = request();
        unknown.document_type = "DNI".to_string();
        assert!(matches!(unknown.to_new_guest(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_into_patch() {
        let patch = GuestUpdateRequest {
            phone: Some("+56 9 1111 2222".to_string()),
            city: Some("  ".to_string()),
            ..Default::default()
        }
        .into_patch();
        assert_eq!(patch.phone.as_deref(), Some("+56 9 1111 2222"));
        assert_eq!(patch.city, None);
        assert!(!patch.is_empty());
        assert!(GuestUpdateRequest::default().into_patch().is_empty());
    }
}
