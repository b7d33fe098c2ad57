//! Booking confirmation email
//!
//! Rendering is plain string formatting; delivery goes through the Resend
//! HTTP API. Sending is fire-and-forget: a failed email is logged and never
//! affects the booking.

use super::{ensure_success, http_client, transport_error, EmailSender, NotificationError};
use crate::reservation_service::BookingConfirmation;
use async_trait::async_trait;
use hotel_core::config::{EmailConfig, HotelConfig};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Rendered email
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Resend API client
pub struct ResendEmailClient {
    http_client: Client,
    api_url: String,
    api_key: String,
    from: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl ResendEmailClient {
    pub fn new(config: &EmailConfig) -> Result<Self, NotificationError> {
        if config.api_key.is_empty() {
            return Err(NotificationError::Config("Email API key is empty".to_string()));
        }

        Ok(Self {
            http_client: http_client(config.timeout_secs)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailClient {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let request = ResendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        ensure_success(response).await?;
        debug!("Email accepted by provider");
        Ok(())
    }
}

/// Format a CLP amount with dot thousands separators, e.g. `$60.000`
pub fn format_clp(amount: Decimal) -> String {
    let rounded = amount.round().abs().to_string();
    let digits = rounded.split('.').next().unwrap_or("0");

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if amount.round().is_sign_negative() && !amount.round().is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the confirmation for the titular guest
///
/// Returns `None` when the guest has no email address on file.
pub fn render_confirmation(
    confirmation: &BookingConfirmation,
    hotel: &HotelConfig,
) -> Option<EmailMessage> {
    let to = confirmation.guest.email.as_deref()?.trim();
    if to.is_empty() {
        return None;
    }

    let name = confirmation.guest.full_name();
    let subject = format!(
        "{}: confirmación de reserva {}",
        hotel.name, confirmation.code
    );

    let mut text = String::new();
    let _ = writeln!(text, "Hola {},", name);
    let _ = writeln!(
        text,
        "Tu reserva {} está registrada del {} al {} ({} noche(s)).",
        confirmation.code,
        confirmation.check_in.format("%d-%m-%Y"),
        confirmation.check_out.format("%d-%m-%Y"),
        confirmation.nights
    );
    for line in &confirmation.rooms {
        let _ = writeln!(
            text,
            "- Habitación {} ({}): {}",
            line.room.number,
            line.room.room_type,
            format_clp(line.reservation.total)
        );
    }
    // Services are already part of the first room's total.
    if let Some(first) = confirmation.rooms.first() {
        if !confirmation.services.is_empty() {
            let _ = writeln!(
                text,
                "Servicios incluidos en la habitación {}:",
                first.room.number
            );
        }
    }
    for service in &confirmation.services {
        let _ = writeln!(
            text,
            "  - {} x{}: {} (incluido)",
            service.name,
            service.quantity,
            format_clp(service.line_total)
        );
    }
    let _ = writeln!(
        text,
        "Total: {} (neto {}, IVA {})",
        format_clp(confirmation.total),
        format_clp(confirmation.breakdown.price_net),
        format_clp(confirmation.breakdown.iva_amount)
    );
    let _ = writeln!(text, "Abonado: {}", format_clp(confirmation.deposit_amount));
    if confirmation.pending_balance > Decimal::ZERO {
        let _ = writeln!(
            text,
            "Saldo pendiente al check-in: {}",
            format_clp(confirmation.pending_balance)
        );
    }

    let mut rows = String::new();
    for line in &confirmation.rooms {
        let _ = write!(
            rows,
            "<tr><td>Habitación {} ({})</td><td align=\"right\">{}</td></tr>",
            escape_html(&line.room.number),
            escape_html(&line.room.room_type),
            format_clp(line.reservation.total)
        );
    }
    for service in &confirmation.services {
        let _ = write!(
            rows,
            "<tr><td>&nbsp;&nbsp;{} x{}</td><td align=\"right\">{} (incluido)</td></tr>",
            escape_html(&service.name),
            service.quantity,
            format_clp(service.line_total)
        );
    }

    let pending = if confirmation.pending_balance > Decimal::ZERO {
        format!(
            "<p>Saldo pendiente al check-in: <strong>{}</strong></p>",
            format_clp(confirmation.pending_balance)
        )
    } else {
        String::new()
    };

    let html = format!(
        "<h2>{hotel}</h2>\
         <p>Hola {name},</p>\
         <p>Tu reserva <strong>{code}</strong> está registrada del {from} al {to} ({nights} noche(s)).</p>\
         <table>{rows}</table>\
         <p>Total: <strong>{total}</strong> (neto {net}, IVA {iva})</p>\
         <p>Abonado: {deposit}</p>{pending}",
        hotel = escape_html(&hotel.name),
        name = escape_html(&name),
        code = escape_html(&confirmation.code),
        from = confirmation.check_in.format("%d-%m-%Y"),
        to = confirmation.check_out.format("%d-%m-%Y"),
        nights = confirmation.nights,
        rows = rows,
        total = format_clp(confirmation.total),
        net = format_clp(confirmation.breakdown.price_net),
        iva = format_clp(confirmation.breakdown.iva_amount),
        deposit = format_clp(confirmation.deposit_amount),
        pending = pending,
    );

    Some(EmailMessage {
        to: to.to_string(),
        subject,
        html,
        text,
    })
}

/// Render and send the confirmation on a detached task
pub fn spawn_confirmation(
    sender: Arc<dyn EmailSender>,
    confirmation: &BookingConfirmation,
    hotel: &HotelConfig,
) {
    let Some(message) = render_confirmation(confirmation, hotel) else {
        debug!(code = %confirmation.code, "Guest has no email, skipping confirmation");
        return;
    };

    let code = confirmation.code.clone();
    tokio::spawn(async move {
        match sender.send(&message).await {
            Ok(()) => info!(code = %code, "Confirmation email sent"),
            Err(e) => warn!(code = %code, error = %e, "Confirmation email failed"),
        }
    });
}
