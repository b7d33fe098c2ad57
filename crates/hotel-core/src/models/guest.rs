//! Guest model
//!
//! Identity records for hotel guests, keyed by document type and number.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DocumentType {
    /// Chilean national id
    #[default]
    #[serde(rename = "RUT")]
    Rut,
    /// Foreign passport
    #[serde(rename = "Pasaporte")]
    Pasaporte,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Rut => write!(f, "RUT"),
            DocumentType::Pasaporte => write!(f, "Pasaporte"),
        }
    }
}

impl DocumentType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rut" => Some(DocumentType::Rut),
            "pasaporte" | "passport" => Some(DocumentType::Pasaporte),
            _ => None,
        }
    }

    /// Normalize a document number for storage and lookup
    ///
    /// RUTs are stored without dots and with an upper-case check digit
    /// (`12.345.678-k` → `12345678-K`); passports are trimmed and upper-cased.
    pub fn normalize_number(&self, number: &str) -> String {
        match self {
            DocumentType::Rut => number
                .trim()
                .chars()
                .filter(|c| *c != '.' && !c.is_whitespace())
                .collect::<String>()
                .to_uppercase(),
            DocumentType::Pasaporte => number.trim().to_uppercase(),
        }
    }
}

/// Guest entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub id: Uuid,
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    /// Name as printed on confirmations
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data for inserting a guest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewGuest {
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewGuest {
    /// Fields a returning guest may have changed since the last booking
    pub fn contact_patch(&self) -> GuestPatch {
        GuestPatch {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            country: self.country.clone(),
            city: self.city.clone(),
            birth_date: self.birth_date,
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Partial guest update; `None` fields are left untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GuestPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl GuestPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.birth_date.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }

    /// Merge the provided fields into `guest`
    pub fn apply_to(&self, guest: &mut Guest) {
        if let Some(v) = &self.first_name {
            guest.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            guest.last_name = v.clone();
        }
        if let Some(v) = &self.country {
            guest.country = Some(v.clone());
        }
        if let Some(v) = &self.city {
            guest.city = Some(v.clone());
        }
        if let Some(v) = self.birth_date {
            guest.birth_date = Some(v);
        }
        if let Some(v) = &self.email {
            guest.email = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            guest.phone = Some(v.clone());
        }
    }
}
