//! Reservation DTOs
//!
//! Request and response types for the booking and lifecycle endpoints.

use super::guest::{GuestRequest, GuestResponse};
use chrono::{DateTime, NaiveDate, Utc};
use hotel_core::models::{
    PaymentStatus, PaymentType, Reservation, ReservationDetail, ReservationStatus,
    ServiceLineDetail,
};
use hotel_core::AppError;
use hotel_services::{BookingConfirmation, CreateReservationParams, ServiceSelection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Booking creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Titular guest
    #[validate(nested)]
    pub guest: GuestRequest,

    /// Accompanying guests
    #[serde(default)]
    pub companions: Vec<GuestRequest>,

    /// Selected rooms; the first one carries the services
    #[validate(length(min = 1, max = 20, message = "Debe seleccionar entre 1 y 20 habitaciones"))]
    pub room_ids: Vec<i32>,

    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    #[serde(default)]
    #[validate(length(max = 50, message = "Demasiados servicios seleccionados"))]
    pub services: Vec<ServiceSelection>,

    /// Booking-wide discount percentage
    #[serde(default)]
    pub discount_percent: Decimal,

    /// `full` or `partial`
    #[serde(default = "default_payment_type")]
    pub payment_type: String,

    /// Deposit received; defaults to the hotel's deposit percentage
    pub deposit_amount: Option<Decimal>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    /// Custom root code, generated when absent
    #[validate(length(min = 1, max = 32))]
    pub code: Option<String>,
}

fn default_payment_type() -> String {
    "partial".to_string()
}

impl CreateReservationRequest {
    /// Convert to service parameters on behalf of `created_by`
    pub fn into_params(self, created_by: Uuid) -> Result<CreateReservationParams, AppError> {
        let payment_type = PaymentType::from_str(&self.payment_type).ok_or_else(|| {
            AppError::Validation(format!("Tipo de pago inválido: {}", self.payment_type))
        })?;

        let mut companions = Vec::with_capacity(self.companions.len());
        for companion in &self.companions {
            companion
                .validate()
                .map_err(|e| AppError::Validation(e.to_string()))?;
            companions.push(companion.to_new_guest()?);
        }

        Ok(CreateReservationParams {
            guest: self.guest.to_new_guest()?,
            companions,
            room_ids: self.room_ids,
            check_in: self.check_in,
            check_out: self.check_out,
            services: self.services,
            discount_percent: self.discount_percent,
            payment_type,
            deposit_amount: self.deposit_amount,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_by: Some(created_by),
            code: self.code,
        })
    }
}

/// Refund registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RefundRequest {
    /// Amount returned to the guest (validated in the service)
    pub amount: Decimal,
}

/// Reservation response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reservation_code: String,
    pub room_id: i32,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_check_in: Option<NaiveDate>,
    pub nights: i32,
    pub total: Decimal,
    pub subtotal_net: Decimal,
    pub iva_amount: Decimal,
    pub discount_percent: Decimal,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub payment_type: PaymentType,
    pub deposit_amount: Decimal,
    pub pending_balance: Decimal,
    pub refund_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            pending_balance: r.pending_balance(),
            id: r.id,
            booking_id: r.booking_id,
            reservation_code: r.reservation_code,
            room_id: r.room_id,
            guest_id: r.guest_id,
            check_in: r.check_in,
            check_out: r.check_out,
            original_check_in: r.original_check_in,
            nights: r.nights,
            total: r.total,
            subtotal_net: r.subtotal_net,
            iva_amount: r.iva_amount,
            discount_percent: r.discount_percent,
            status: r.status,
            payment_status: r.payment_status,
            payment_type: r.payment_type,
            deposit_amount: r.deposit_amount,
            refund_amount: r.refund_amount,
            notes: r.notes,
            paid_at: r.paid_at,
            refunded_at: r.refunded_at,
            cancelled_at: r.cancelled_at,
            created_at: r.created_at,
        }
    }
}

/// Detail page response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetailResponse {
    pub reservation: ReservationResponse,
    pub guest: GuestResponse,
    pub companions: Vec<GuestResponse>,
    pub room_number: String,
    pub room_type: String,
    pub created_by: Option<String>,
    pub services: Vec<ServiceLineDetail>,
    pub services_total: Decimal,
}

impl From<ReservationDetail> for ReservationDetailResponse {
    fn from(detail: ReservationDetail) -> Self {
        Self {
            services_total: detail.services_total(),
            reservation: detail.reservation.into(),
            guest: detail.guest.into(),
            companions: detail.companions.into_iter().map(Into::into).collect(),
            room_number: detail.room.number,
            room_type: detail.room.room_type,
            created_by: detail.creator.map(|p| p.full_name),
            services: detail.services,
        }
    }
}

/// Booking creation response
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub code: String,
    pub guest: GuestResponse,
    pub reservations: Vec<ReservationResponse>,
    pub total: Decimal,
    pub price_net: Decimal,
    pub iva_amount: Decimal,
    pub deposit_amount: Decimal,
    pub pending_balance: Decimal,
}

impl From<BookingConfirmation> for BookingResponse {
    fn from(c: BookingConfirmation) -> Self {
        Self {
            booking_id: c.booking_id,
            code: c.code,
            guest: c.guest.into(),
            reservations: c
                .rooms
                .into_iter()
                .map(|line| line.reservation.into())
                .collect(),
            total: c.total,
            price_net: c.breakdown.price_net,
            iva_amount: c.breakdown.iva_amount,
            deposit_amount: c.deposit_amount,
            pending_balance: c.pending_balance,
        }
    }
}
