//! Application configuration
//!
//! Centralized configuration management using the `config` crate.
//! Values come from built-in defaults, optional config files and
//! `HOTEL__`-prefixed environment variables.

use crate::error::AppError;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::debug;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub hotel: HotelConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Run embedded migrations at startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_run_migrations() -> bool {
    true
}

/// Authentication configuration
///
/// Staff sign in with the hosted auth provider; this backend only verifies
/// the HS256 access tokens it issues.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret shared with the auth provider
    pub jwt_secret: String,

    /// Expected `aud` claim, if the provider sets one
    #[serde(default)]
    pub audience: Option<String>,
}

/// Hotel business settings
#[derive(Debug, Deserialize, Clone)]
pub struct HotelConfig {
    /// IANA timezone used to decide what "today" is at the front desk
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// IVA percentage included in display prices
    #[serde(default = "default_iva_percent")]
    pub iva_percent: u32,

    /// Suggested deposit percentage for partial payments
    #[serde(default = "default_deposit_percent")]
    pub default_deposit_percent: u32,

    /// ISO 4217 currency code used in notifications
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Hotel name shown in emails and WhatsApp messages
    #[serde(default = "default_hotel_name")]
    pub name: String,
}

fn default_timezone() -> String {
    "America/Santiago".to_string()
}

fn default_iva_percent() -> u32 {
    19
}

fn default_deposit_percent() -> u32 {
    30
}

fn default_currency() -> String {
    "CLP".to_string()
}

fn default_hotel_name() -> String {
    "Hotel".to_string()
}

impl HotelConfig {
    /// Parse the configured timezone
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("Invalid timezone {}: {}", self.timezone, e)))
    }
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            iva_percent: default_iva_percent(),
            default_deposit_percent: default_deposit_percent(),
            currency: default_currency(),
            name: default_hotel_name(),
        }
    }
}

/// Transactional email API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    pub api_key: String,
    /// Sender address, e.g. `Reservas <reservas@hotel.cl>`
    pub from: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

/// WhatsApp Cloud API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WhatsAppConfig {
    #[serde(default = "default_whatsapp_api_url")]
    pub api_url: String,
    pub phone_number_id: String,
    pub access_token: String,
    /// Recipient of incident notifications
    pub maintenance_phone: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_whatsapp_api_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

/// LLM (OpenAI-compatible chat completions) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_http_timeout() -> u64 {
    15
}

impl AppConfig {
    /// Load configuration from environment and optional config files
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        debug!(run_mode = %run_mode, "Loading configuration");

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.run_migrations", true)?
            .set_default("hotel.timezone", "America/Santiago")?
            .set_default("hotel.iva_percent", 19)?
            .set_default("hotel.default_deposit_percent", 30)?
            .set_default("hotel.currency", "CLP")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("HOTEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        debug!(
            email = app.email.is_some(),
            whatsapp = app.whatsapp.is_some(),
            llm = app.llm.is_some(),
            "Configuration loaded"
        );
        Ok(app)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("HOTEL").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
