//! Business logic services for the hotel back-office
//!
//! - `pricing` - IVA breakdown, discounts and deposits (pure functions)
//! - `ReservationService` - booking, cancellation, check-in/out and payments
//! - `notifications` - email, WhatsApp and incident classification clients
//! - `IncidentService` - classify maintenance incidents and notify by WhatsApp
//!
//! Services own their repositories behind `Arc` and are generic over the
//! repository traits from `hotel-core`, so they can run against PostgreSQL
//! or in-memory fakes.

pub mod incident;
pub mod notifications;
pub mod pricing;
pub mod reservation_service;

pub use incident::{IncidentService, ReportIncident};
pub use pricing::{apply_discount, deposit_for, nights_between, price_breakdown, PriceBreakdown};
pub use reservation_service::{
    BookingConfirmation, ConfirmedRoom, ConfirmedService, CreateReservationParams, GuestHistory,
    PgReservationService, ReservationService, ReservationSettings, ServiceSelection,
};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Chilean IVA rate included in display prices
    pub const DEFAULT_IVA_PERCENT: Decimal = dec!(19);

    /// Customary deposit for partial payments
    pub const DEFAULT_DEPOSIT_PERCENT: Decimal = dec!(30);

    /// Longest stay accepted in one booking
    pub const MAX_NIGHTS: i64 = 90;

    /// Most rooms accepted in one booking
    pub const MAX_ROOMS_PER_BOOKING: usize = 20;

    /// Most units of one add-on service in a booking
    pub const MAX_SERVICE_QUANTITY: i32 = 999;
}
