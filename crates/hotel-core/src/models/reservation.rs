//! Reservation and booking models
//!
//! A booking is one front-desk transaction; it produces one reservation row
//! per selected room. Rows of the same booking share `booking_id` and a code
//! prefix (`CODE`, `CODE-1`, `CODE-2`, ...).
//!
//! Reservation lifecycle:
//! 1. Created as `Pendiente` (deposit) or `Confirmada` (paid in full)
//! 2. `Check-in` when the guest arrives, which occupies the room
//! 3. `Finalizada` at check-out, which releases the room
//!
//! `Cancelada` is reachable from every state before `Finalizada`.

use super::catalog::{NewServiceLine, ServiceLineDetail};
use super::guest::Guest;
use super::profile::Profile;
use super::room::Room;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReservationStatus {
    /// Booked with a deposit, balance still due
    #[default]
    Pendiente,
    /// Booked and paid in full
    Confirmada,
    /// Guest is staying
    #[serde(rename = "Check-in")]
    CheckIn,
    /// Guest checked out
    Finalizada,
    /// Cancelled before check-out
    Cancelada,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pendiente => write!(f, "Pendiente"),
            ReservationStatus::Confirmada => write!(f, "Confirmada"),
            ReservationStatus::CheckIn => write!(f, "Check-in"),
            ReservationStatus::Finalizada => write!(f, "Finalizada"),
            ReservationStatus::Cancelada => write!(f, "Cancelada"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pendiente" => Some(ReservationStatus::Pendiente),
            "confirmada" => Some(ReservationStatus::Confirmada),
            "check-in" | "checkin" => Some(ReservationStatus::CheckIn),
            "finalizada" => Some(ReservationStatus::Finalizada),
            "cancelada" => Some(ReservationStatus::Cancelada),
            _ => None,
        }
    }

    /// Still blocks its room for the booked dates
    pub fn is_active(&self) -> bool {
        !self.is_final()
    }

    /// No further transitions allowed
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Finalizada | ReservationStatus::Cancelada
        )
    }

    pub fn can_cancel(&self) -> bool {
        !self.is_final()
    }
}

/// Payment status, evolves semi-independently of [`ReservationStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    RefundPending,
    Refunded,
    /// Deposit kept by the hotel after a cancellation
    Retained,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::RefundPending => write!(f, "refund_pending"),
            PaymentStatus::Refunded => write!(f, "refunded"),
            PaymentStatus::Retained => write!(f, "retained"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            "refund_pending" => Some(PaymentStatus::RefundPending),
            "refunded" => Some(PaymentStatus::Refunded),
            "retained" => Some(PaymentStatus::Retained),
            _ => None,
        }
    }

    /// Payment status recorded when the reservation is cancelled
    ///
    /// Deposits are retained, full payments wait for a manual refund.
    pub fn after_cancellation(self) -> Self {
        match self {
            PaymentStatus::Partial => PaymentStatus::Retained,
            PaymentStatus::Paid => PaymentStatus::RefundPending,
            other => other,
        }
    }
}

/// How the booking was paid at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Full,
    #[default]
    Partial,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Full => write!(f, "full"),
            PaymentType::Partial => write!(f, "partial"),
        }
    }
}

impl PaymentType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" | "total" => Some(PaymentType::Full),
            "partial" | "abono" => Some(PaymentType::Partial),
            _ => None,
        }
    }
}

/// Reservation entity, one per booked room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub booking_id: Uuid,

    /// Human-facing code, `CODE` for the first room and `CODE-i` for siblings
    pub reservation_code: String,

    pub room_id: i32,

    /// Titular guest
    pub guest_id: Uuid,

    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    /// Scheduled arrival date, kept when check-in rewrites `check_in`
    pub original_check_in: Option<NaiveDate>,

    pub nights: i32,

    /// Amount charged for this row, IVA included
    pub total: Decimal,
    pub subtotal_net: Decimal,
    pub iva_amount: Decimal,
    pub discount_percent: Decimal,

    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub payment_type: PaymentType,
    pub deposit_amount: Decimal,
    pub refund_amount: Option<Decimal>,

    pub notes: Option<String>,

    /// Staff profile that created the booking
    pub created_by: Option<Uuid>,

    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Code for the room at `index` within a booking
    pub fn code_for(root: &str, index: usize) -> String {
        if index == 0 {
            root.to_string()
        } else {
            format!("{}-{}", root, index)
        }
    }

    /// Amount still owed by the guest
    #[inline]
    pub fn pending_balance(&self) -> Decimal {
        if self.payment_status == PaymentStatus::Paid {
            return Decimal::ZERO;
        }
        (self.total - self.deposit_amount).max(Decimal::ZERO)
    }

    pub fn has_pending_balance(&self) -> bool {
        self.pending_balance() > Decimal::ZERO
    }

    /// True if the stay covers `day` (arrival day inclusive, departure day inclusive)
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day <= self.check_out
    }
}

/// Data for inserting one reservation row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReservation {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reservation_code: String,
    pub room_id: i32,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i32,
    pub total: Decimal,
    pub subtotal_net: Decimal,
    pub iva_amount: Decimal,
    pub discount_percent: Decimal,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub payment_type: PaymentType,
    pub deposit_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl NewReservation {
    /// Materialize the row as the database would return it
    pub fn into_reservation(self, now: DateTime<Utc>) -> Reservation {
        Reservation {
            id: self.id,
            booking_id: self.booking_id,
            reservation_code: self.reservation_code,
            room_id: self.room_id,
            guest_id: self.guest_id,
            check_in: self.check_in,
            check_out: self.check_out,
            original_check_in: None,
            nights: self.nights,
            total: self.total,
            subtotal_net: self.subtotal_net,
            iva_amount: self.iva_amount,
            discount_percent: self.discount_percent,
            status: self.status,
            payment_status: self.payment_status,
            payment_type: self.payment_type,
            deposit_amount: self.deposit_amount,
            refund_amount: None,
            notes: self.notes,
            created_by: self.created_by,
            paid_at: self.paid_at,
            refunded_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Everything persisted by one booking, written atomically
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub id: Uuid,
    /// Root reservation code
    pub code: String,
    pub created_by: Option<Uuid>,
    /// One row per room; index 0 is the primary room
    pub reservations: Vec<NewReservation>,
    /// Service lines, all attached to the primary room's reservation
    pub services: Vec<NewServiceLine>,
    /// Accompanying guests, linked to the primary room's reservation
    pub companions: Vec<Uuid>,
}

/// Partial reservation update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationPatch {
    pub status: Option<ReservationStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub check_in: Option<NaiveDate>,
    pub original_check_in: Option<NaiveDate>,
    pub deposit_amount: Option<Decimal>,
    pub refund_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        *self == ReservationPatch::default()
    }

    /// Merge the provided fields into `reservation`
    pub fn apply_to(&self, reservation: &mut Reservation) {
        if let Some(v) = self.status {
            reservation.status = v;
        }
        if let Some(v) = self.payment_status {
            reservation.payment_status = v;
        }
        if let Some(v) = self.check_in {
            reservation.check_in = v;
        }
        if let Some(v) = self.original_check_in {
            reservation.original_check_in = Some(v);
        }
        if let Some(v) = self.deposit_amount {
            reservation.deposit_amount = v;
        }
        if let Some(v) = self.refund_amount {
            reservation.refund_amount = Some(v);
        }
        if let Some(v) = &self.notes {
            reservation.notes = Some(v.clone());
        }
        if let Some(v) = self.paid_at {
            reservation.paid_at = Some(v);
        }
        if let Some(v) = self.refunded_at {
            reservation.refunded_at = Some(v);
        }
        if let Some(v) = self.cancelled_at {
            reservation.cancelled_at = Some(v);
        }
    }
}

/// Joined view of a reservation used by the detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    pub reservation: Reservation,
    pub guest: Guest,
    pub room: Room,
    pub creator: Option<Profile>,
    pub services: Vec<ServiceLineDetail>,
    /// Accompanying guests, only recorded on the primary room's row
    #[serde(default)]
    pub companions: Vec<Guest>,
}

impl ReservationDetail {
    pub fn services_total(&self) -> Decimal {
        self.services.iter().map(ServiceLineDetail::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(total: Decimal, deposit: Decimal, payment_status: PaymentStatus) -> Reservation {
        NewReservation {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            reservation_code: "R-0001".to_string(),
            room_id: 1,
            guest_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            nights: 2,
            total,
            subtotal_net: Decimal::ZERO,
            iva_amount: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            status: ReservationStatus::Pendiente,
            payment_status,
            payment_type: PaymentType::Partial,
            deposit_amount: deposit,
            notes: None,
            created_by: None,
            paid_at: None,
        }
        .into_reservation(Utc::now())
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ReservationStatus::CheckIn.to_string(), "Check-in");
        assert_eq!(
            ReservationStatus::from_str("check-in"),
            Some(ReservationStatus::CheckIn)
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::CheckIn).unwrap(),
            "\"Check-in\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::RefundPending).unwrap(),
            "\"refund_pending\""
        );
    }

    #[test]
    fn test_final_states() {
        assert!(ReservationStatus::Pendiente.can_cancel());
        assert!(ReservationStatus::CheckIn.can_cancel());
        assert!(!ReservationStatus::Finalizada.can_cancel());
        assert!(!ReservationStatus::Cancelada.is_active());
    }

    #[test]
    fn test_payment_status_after_cancellation() {
        assert_eq!(
            PaymentStatus::Partial.after_cancellation(),
            PaymentStatus::Retained
        );
        assert_eq!(
            PaymentStatus::Paid.after_cancellation(),
            PaymentStatus::RefundPending
        );
        assert_eq!(
            PaymentStatus::Pending.after_cancellation(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_pending_balance() {
        let res = sample(dec!(60000), dec!(18000), PaymentStatus::Partial);
        assert_eq!(res.pending_balance(), dec!(42000));
        assert!(res.has_pending_balance());

        let paid = sample(dec!(60000), dec!(0), PaymentStatus::Paid);
        assert_eq!(paid.pending_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_code_for() {
        assert_eq!(Reservation::code_for("R-0001", 0), "R-0001");
        assert_eq!(Reservation::code_for("R-0001", 2), "R-0001-2");
    }

    #[test]
    fn test_patch_apply() {
        let mut res = sample(dec!(60000), dec!(18000), PaymentStatus::Partial);
        let patch = ReservationPatch {
            status: Some(ReservationStatus::Cancelada),
            payment_status: Some(PaymentStatus::Retained),
            ..Default::default()
        };
        patch.apply_to(&mut res);
        assert_eq!(res.status, ReservationStatus::Cancelada);
        assert_eq!(res.payment_status, PaymentStatus::Retained);
        assert_eq!(res.deposit_amount, dec!(18000));
        assert!(ReservationPatch::default().is_empty());
    }
}
