//! Maintenance incident model
//!
//! Incidents are reported by staff in free text, classified by a language
//! model and forwarded to the maintenance phone over WhatsApp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Incident category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    Electricidad,
    Plomeria,
    Climatizacion,
    Limpieza,
    Mobiliario,
    Seguridad,
    #[default]
    Otro,
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentCategory::Electricidad => "electricidad",
            IncidentCategory::Plomeria => "plomeria",
            IncidentCategory::Climatizacion => "climatizacion",
            IncidentCategory::Limpieza => "limpieza",
            IncidentCategory::Mobiliario => "mobiliario",
            IncidentCategory::Seguridad => "seguridad",
            IncidentCategory::Otro => "otro",
        };
        write!(f, "{}", s)
    }
}

impl IncidentCategory {
    /// Parse from string (case-insensitive, accents tolerated)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "electricidad" => Some(IncidentCategory::Electricidad),
            "plomeria" | "plomería" => Some(IncidentCategory::Plomeria),
            "climatizacion" | "climatización" => Some(IncidentCategory::Climatizacion),
            "limpieza" => Some(IncidentCategory::Limpieza),
            "mobiliario" => Some(IncidentCategory::Mobiliario),
            "seguridad" => Some(IncidentCategory::Seguridad),
            "otro" => Some(IncidentCategory::Otro),
            _ => None,
        }
    }
}

/// Incident priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncidentPriority {
    Baja,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl fmt::Display for IncidentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentPriority::Baja => write!(f, "baja"),
            IncidentPriority::Media => write!(f, "media"),
            IncidentPriority::Alta => write!(f, "alta"),
            IncidentPriority::Urgente => write!(f, "urgente"),
        }
    }
}

impl IncidentPriority {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "baja" => Some(IncidentPriority::Baja),
            "media" => Some(IncidentPriority::Media),
            "alta" => Some(IncidentPriority::Alta),
            "urgente" => Some(IncidentPriority::Urgente),
            _ => None,
        }
    }
}

/// Classifier output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IncidentClassification {
    pub category: IncidentCategory,
    pub priority: IncidentPriority,
    /// One-line summary suitable for a chat message
    #[serde(default)]
    pub summary: Option<String>,
}

/// Incident as reported and classified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    /// Room number or area ("Lobby", "Piscina")
    pub location: String,
    pub description: String,
    pub reported_by: Option<String>,
    pub classification: IncidentClassification,
    /// Whether the maintenance phone was notified
    pub notified: bool,
    pub reported_at: DateTime<Utc>,
}
