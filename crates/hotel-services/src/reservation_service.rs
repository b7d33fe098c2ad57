//! Reservation service
//!
//! Orchestrates guests, rooms and reservation rows through the booking
//! lifecycle:
//! - Create a booking (one row per room, priced and persisted atomically)
//! - Cancel, recording the refund intent for the back-office
//! - Check-in / check-out, keeping room status in the same transaction
//! - Settle the balance and record refunds

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use hotel_core::{
    config::HotelConfig,
    models::{
        DocumentType, Guest, GuestPatch, NewBooking, NewGuest, NewReservation, NewServiceLine,
        PaymentStatus, PaymentType, Reservation, ReservationDetail, ReservationPatch,
        ReservationStatus, Room, RoomStatus, Service,
    },
    traits::{GuestRepository, ReservationRepository, RoomRepository, ServiceCatalogRepository},
    AppError, AppResult,
};
use hotel_db::{
    PgGuestRepository, PgPool, PgReservationRepository, PgRoomRepository,
    PgServiceCatalogRepository,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_DEPOSIT_PERCENT, DEFAULT_IVA_PERCENT, MAX_NIGHTS, MAX_ROOMS_PER_BOOKING,
    MAX_SERVICE_QUANTITY,
};
use crate::pricing::{apply_discount, deposit_for, nights_between, price_breakdown, PriceBreakdown};

/// Add-on service picked at booking time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service_id: i32,
    pub quantity: i32,
}

/// Input for [`ReservationService::create_reservation`]
#[derive(Debug, Clone)]
pub struct CreateReservationParams {
    /// Titular guest as submitted by the front desk
    pub guest: NewGuest,
    pub companions: Vec<NewGuest>,
    /// Selected rooms; the first one carries the services
    pub room_ids: Vec<i32>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub services: Vec<ServiceSelection>,
    /// Booking-wide discount percentage
    pub discount_percent: Decimal,
    pub payment_type: PaymentType,
    /// Deposit received for partial payments; defaults to the configured percentage
    pub deposit_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    /// Root reservation code; generated when absent
    pub code: Option<String>,
}

/// Room row of a confirmed booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedRoom {
    pub room: Room,
    pub reservation: Reservation,
}

/// Service line of a confirmed booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedService {
    pub service_id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Everything the caller needs to confirm a booking to the guest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: Uuid,
    pub code: String,
    pub guest: Guest,
    pub companions: Vec<Guest>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i32,
    pub rooms: Vec<ConfirmedRoom>,
    pub services: Vec<ConfirmedService>,
    pub discount_percent: Decimal,
    pub payment_type: PaymentType,
    /// Sum of all room totals, IVA included
    pub total: Decimal,
    pub breakdown: PriceBreakdown,
    pub deposit_amount: Decimal,
    pub pending_balance: Decimal,
}

/// Guest with their reservation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestHistory {
    pub guest: Guest,
    pub reservations: Vec<Reservation>,
}

/// Business settings used by the reservation flow
#[derive(Debug, Clone)]
pub struct ReservationSettings {
    pub iva_percent: Decimal,
    pub default_deposit_percent: Decimal,
    /// Timezone deciding the front desk's "today"
    pub timezone: Tz,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            iva_percent: DEFAULT_IVA_PERCENT,
            default_deposit_percent: DEFAULT_DEPOSIT_PERCENT,
            timezone: chrono_tz::America::Santiago,
        }
    }
}

impl ReservationSettings {
    pub fn from_config(hotel: &HotelConfig) -> AppResult<Self> {
        Ok(Self {
            iva_percent: Decimal::from(hotel.iva_percent),
            default_deposit_percent: Decimal::from(hotel.default_deposit_percent),
            timezone: hotel.tz()?,
        })
    }
}

/// Reservation service backed by PostgreSQL
pub type PgReservationService = ReservationService<
    PgGuestRepository,
    PgRoomRepository,
    PgReservationRepository,
    PgServiceCatalogRepository,
>;

impl PgReservationService {
    /// Wire the PostgreSQL repositories on a shared pool
    pub fn from_pool(pool: PgPool, hotel: &HotelConfig) -> AppResult<Self> {
        Ok(Self::new(
            Arc::new(PgGuestRepository::new(pool.clone())),
            Arc::new(PgRoomRepository::new(pool.clone())),
            Arc::new(PgReservationRepository::new(pool.clone())),
            Arc::new(PgServiceCatalogRepository::new(pool)),
            ReservationSettings::from_config(hotel)?,
        ))
    }
}

/// Reservation service
pub struct ReservationService<G, R, V, S>
where
    G: GuestRepository,
    R: RoomRepository,
    V: ReservationRepository,
    S: ServiceCatalogRepository,
{
    guest_repo: Arc<G>,
    room_repo: Arc<R>,
    reservation_repo: Arc<V>,
    catalog_repo: Arc<S>,
    settings: ReservationSettings,
}

impl<G, R, V, S> ReservationService<G, R, V, S>
where
    G: GuestRepository,
    R: RoomRepository,
    V: ReservationRepository,
    S: ServiceCatalogRepository,
{
    pub fn new(
        guest_repo: Arc<G>,
        room_repo: Arc<R>,
        reservation_repo: Arc<V>,
        catalog_repo: Arc<S>,
        settings: ReservationSettings,
    ) -> Self {
        Self {
            guest_repo,
            room_repo,
            reservation_repo,
            catalog_repo,
            settings,
        }
    }

    pub fn settings(&self) -> &ReservationSettings {
        &self.settings
    }

    /// Current date at the hotel
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.timezone).date_naive()
    }

    /// IVA split of a display price at the configured rate
    pub fn price_breakdown(&self, price_display: Decimal) -> PriceBreakdown {
        price_breakdown(price_display, self.settings.iva_percent)
    }

    /// Generated root code, e.g. `RES-260118-3FA2C1`
    fn generate_code(&self, booking_id: Uuid) -> String {
        let suffix = booking_id.simple().to_string();
        format!(
            "RES-{}-{}",
            self.today().format("%y%m%d"),
            suffix[..6].to_uppercase()
        )
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::ReservationNotFound(id.to_string())
    }

    async fn load_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        self.reservation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Find the guest by document, creating or refreshing the record
    ///
    /// Contact fields from the form overwrite stored ones. A concurrent
    /// insert of the same document is resolved by re-reading it.
    #[instrument(skip(self, guest), fields(document_type = %guest.document_type))]
    async fn resolve_guest(&self, guest: &NewGuest) -> AppResult<Guest> {
        validate_guest(guest)?;

        if let Some(existing) = self
            .guest_repo
            .find_by_document(guest.document_type, &guest.document_number)
            .await?
        {
            debug!("Refreshing returning guest {}", existing.id);
            return self
                .guest_repo
                .update(existing.id, &guest.contact_patch())
                .await;
        }

        match self.guest_repo.create(guest).await {
            Ok(created) => {
                info!("Registered new guest {}", created.id);
                Ok(created)
            }
            Err(AppError::DuplicateDocument { .. }) => {
                warn!("Guest document registered concurrently, reusing record");
                let existing = self
                    .guest_repo
                    .find_by_document(guest.document_type, &guest.document_number)
                    .await?
                    .ok_or_else(|| {
                        AppError::GuestNotFound(format!(
                            "{} {}",
                            guest.document_type, guest.document_number
                        ))
                    })?;
                self.guest_repo
                    .update(existing.id, &guest.contact_patch())
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Create a booking
    ///
    /// One reservation row per room. The first room absorbs the add-on
    /// services and, for partial payments, the deposit up to its own total;
    /// any excess moves on to the next rooms. Rows, service
    /// lines and companions are written in a single transaction.
    ///
    /// # Errors
    ///
    /// - `Validation` for empty room selections, bad date ranges, bad
    ///   quantities or deposits
    /// - `RoomNotFound` / `NotFound` for unknown rooms or services
    #[instrument(skip(self, params), fields(rooms = params.room_ids.len()))]
    pub async fn create_reservation(
        &self,
        params: CreateReservationParams,
    ) -> AppResult<BookingConfirmation> {
        let nights = validate_stay(params.check_in, params.check_out)?;
        validate_room_selection(&params.room_ids)?;
        if params.discount_percent < Decimal::ZERO || params.discount_percent > Decimal::ONE_HUNDRED
        {
            return Err(AppError::Validation(
                "El descuento debe estar entre 0 y 100".to_string(),
            ));
        }
        if params
            .services
            .iter()
            .any(|s| s.quantity < 1 || s.quantity > MAX_SERVICE_QUANTITY)
        {
            return Err(AppError::Validation(format!(
                "La cantidad de cada servicio debe estar entre 1 y {}",
                MAX_SERVICE_QUANTITY
            )));
        }

        let rooms = self.load_rooms(&params.room_ids).await?;
        let services = self.load_services(&params.services).await?;
        let services_total: Decimal = services.iter().map(|s| s.line_total).sum();

        let room_totals: Vec<Decimal> = rooms
            .iter()
            .enumerate()
            .map(|(i, room)| {
                let mut base = room.lodging_total(nights);
                if i == 0 {
                    base += services_total;
                }
                apply_discount(base, params.discount_percent)
            })
            .collect();
        let grand_total: Decimal = room_totals.iter().copied().sum();

        let deposit = match params.payment_type {
            PaymentType::Full => grand_total,
            PaymentType::Partial => {
                let deposit = params.deposit_amount.unwrap_or_else(|| {
                    deposit_for(grand_total, self.settings.default_deposit_percent)
                });
                if deposit < Decimal::ZERO || deposit > grand_total {
                    return Err(AppError::Validation(format!(
                        "El abono debe estar entre 0 y {}",
                        grand_total
                    )));
                }
                deposit
            }
        };

        let deposits = allocate_deposit(deposit, &room_totals);

        let booking_id = Uuid::new_v4();
        let code = match params.code.as_deref().map(str::trim) {
            Some(code) => {
                validate_code(code)?;
                code.to_string()
            }
            None => self.generate_code(booking_id),
        };

        validate_guest(&params.guest)?;
        for companion in &params.companions {
            validate_guest(companion)?;
        }

        let guest = self.resolve_guest(&params.guest).await?;
        let mut companions: Vec<Guest> = Vec::with_capacity(params.companions.len());
        for companion in &params.companions {
            let resolved = self.resolve_guest(companion).await?;
            if resolved.id != guest.id && companions.iter().all(|c| c.id != resolved.id) {
                companions.push(resolved);
            }
        }

        let now = Utc::now();
        let reservations: Vec<NewReservation> = rooms
            .iter()
            .zip(&room_totals)
            .enumerate()
            .map(|(i, (room, &total))| {
                let breakdown = self.price_breakdown(total);
                let (status, payment_status, deposit_amount, paid_at) = match params.payment_type {
                    PaymentType::Full => (
                        ReservationStatus::Confirmada,
                        PaymentStatus::Paid,
                        total,
                        Some(now),
                    ),
                    PaymentType::Partial => (
                        ReservationStatus::Pendiente,
                        PaymentStatus::Partial,
                        deposits[i],
                        None,
                    ),
                };

                NewReservation {
                    id: Uuid::new_v4(),
                    booking_id,
                    reservation_code: Reservation::code_for(&code, i),
                    room_id: room.id,
                    guest_id: guest.id,
                    check_in: params.check_in,
                    check_out: params.check_out,
                    nights,
                    total,
                    subtotal_net: breakdown.price_net,
                    iva_amount: breakdown.iva_amount,
                    discount_percent: params.discount_percent,
                    status,
                    payment_status,
                    payment_type: params.payment_type,
                    deposit_amount,
                    notes: params.notes.clone(),
                    created_by: params.created_by,
                    paid_at,
                }
            })
            .collect();

        let primary_id = reservations[0].id;
        let booking = NewBooking {
            id: booking_id,
            code: code.clone(),
            created_by: params.created_by,
            services: services
                .iter()
                .map(|s| NewServiceLine {
                    reservation_id: primary_id,
                    service_id: s.service_id,
                    quantity: s.quantity,
                    unit_price: s.unit_price,
                })
                .collect(),
            companions: companions.iter().map(|c| c.id).collect(),
            reservations,
        };

        let rows = self.reservation_repo.create_booking(&booking).await?;

        let breakdown = PriceBreakdown {
            price_display: grand_total,
            price_net: rows.iter().map(|r| r.subtotal_net).sum(),
            iva_amount: rows.iter().map(|r| r.iva_amount).sum(),
        };
        let deposit_amount: Decimal = rows.iter().map(|r| r.deposit_amount).sum();
        let pending_balance = (grand_total - deposit_amount).max(Decimal::ZERO);

        info!(
            booking_id = %booking_id,
            code = %code,
            guest_id = %guest.id,
            total = %grand_total,
            payment_type = %params.payment_type,
            "Booking created with {} room(s)",
            rows.len()
        );

        Ok(BookingConfirmation {
            booking_id,
            code,
            guest,
            companions,
            check_in: params.check_in,
            check_out: params.check_out,
            nights,
            rooms: rooms
                .into_iter()
                .zip(rows)
                .map(|(room, reservation)| ConfirmedRoom { room, reservation })
                .collect(),
            services,
            discount_percent: params.discount_percent,
            payment_type: params.payment_type,
            total: grand_total,
            breakdown,
            deposit_amount,
            pending_balance,
        })
    }

    /// Rooms in selection order
    async fn load_rooms(&self, room_ids: &[i32]) -> AppResult<Vec<Room>> {
        let found = self.room_repo.find_by_ids(room_ids).await?;
        let mut by_id: HashMap<i32, Room> = found.into_iter().map(|r| (r.id, r)).collect();

        room_ids
            .iter()
            .map(|id| {
                by_id
                    .remove(id)
                    .ok_or_else(|| AppError::RoomNotFound(id.to_string()))
            })
            .collect()
    }

    /// Catalog prices for the selection, same service selected twice is merged
    async fn load_services(
        &self,
        selections: &[ServiceSelection],
    ) -> AppResult<Vec<ConfirmedService>> {
        if selections.is_empty() {
            return Ok(Vec::new());
        }

        let mut quantities: Vec<(i32, i32)> = Vec::new();
        for selection in selections {
            match quantities.iter_mut().find(|(id, _)| *id == selection.service_id) {
                Some((_, qty)) => {
                    *qty = qty
                        .checked_add(selection.quantity)
                        .filter(|q| *q <= MAX_SERVICE_QUANTITY)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "La cantidad del servicio {} supera el máximo de {}",
                                selection.service_id, MAX_SERVICE_QUANTITY
                            ))
                        })?;
                }
                None => quantities.push((selection.service_id, selection.quantity)),
            }
        }

        let ids: Vec<i32> = quantities.iter().map(|(id, _)| *id).collect();
        let catalog: HashMap<i32, Service> = self
            .catalog_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        quantities
            .into_iter()
            .map(|(service_id, quantity)| {
                let service = catalog
                    .get(&service_id)
                    .filter(|s| s.active)
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Servicio {} no disponible", service_id))
                    })?;
                Ok(ConfirmedService {
                    service_id,
                    name: service.name.clone(),
                    quantity,
                    unit_price: service.unit_price,
                    line_total: service.unit_price * Decimal::from(quantity),
                })
            })
            .collect()
    }

    /// Cancel a reservation
    ///
    /// Deposits are retained and full payments become `refund_pending`. A
    /// guest who is already in the room releases it.
    #[instrument(skip(self))]
    pub async fn cancel_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        let reservation = self.load_reservation(id).await?;

        if !reservation.status.can_cancel() {
            warn!(
                "Rejected cancellation of {} in status {}",
                reservation.reservation_code, reservation.status
            );
            return Err(AppError::InvalidTransition {
                action: "cancelar".to_string(),
                status: reservation.status.to_string(),
            });
        }

        let patch = ReservationPatch {
            status: Some(ReservationStatus::Cancelada),
            payment_status: Some(reservation.payment_status.after_cancellation()),
            cancelled_at: Some(Utc::now()),
            ..Default::default()
        };

        let updated = if reservation.status == ReservationStatus::CheckIn {
            self.reservation_repo
                .update_with_room_status(id, &patch, reservation.room_id, RoomStatus::Disponible)
                .await?
        } else {
            self.reservation_repo.update(id, &patch).await?
        };

        info!(
            code = %updated.reservation_code,
            payment_status = %updated.payment_status,
            "Reservation cancelled"
        );

        Ok(updated)
    }

    /// Check the guest in
    ///
    /// The stay's `check_in` becomes today's date at the hotel; the booked
    /// arrival date is kept in `original_check_in`. Nothing is written when a
    /// precondition fails.
    #[instrument(skip(self))]
    pub async fn perform_check_in(&self, id: Uuid) -> AppResult<Reservation> {
        let reservation = self.load_reservation(id).await?;

        if reservation.status.is_final() {
            return Err(AppError::InvalidTransition {
                action: "hacer check-in en".to_string(),
                status: reservation.status.to_string(),
            });
        }

        if reservation.has_pending_balance() {
            let pending = reservation.pending_balance();
            warn!(
                "Check-in of {} rejected, pending balance {}",
                reservation.reservation_code, pending
            );
            return Err(AppError::PendingBalance {
                pending: pending.to_string(),
            });
        }

        if reservation.status == ReservationStatus::CheckIn {
            return Err(AppError::AlreadyCheckedIn(reservation.reservation_code));
        }

        let room = self
            .room_repo
            .find_by_id(reservation.room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(reservation.room_id.to_string()))?;

        if room.is_occupied() {
            warn!("Check-in rejected, room {} is occupied", room.number);
            return Err(AppError::RoomOccupied(room.number));
        }

        let today = self.today();
        if today >= reservation.check_out {
            return Err(AppError::Validation(format!(
                "La estadía terminó el {}",
                reservation.check_out
            )));
        }

        let patch = ReservationPatch {
            status: Some(ReservationStatus::CheckIn),
            check_in: Some(today),
            original_check_in: Some(
                reservation
                    .original_check_in
                    .unwrap_or(reservation.check_in),
            ),
            ..Default::default()
        };

        let updated = self
            .reservation_repo
            .update_with_room_status(id, &patch, room.id, RoomStatus::Ocupada)
            .await?;

        info!(
            code = %updated.reservation_code,
            room = %room.number,
            "Guest checked in"
        );

        Ok(updated)
    }

    /// Check the guest out and release the room
    #[instrument(skip(self))]
    pub async fn perform_check_out(&self, id: Uuid) -> AppResult<Reservation> {
        let reservation = self.load_reservation(id).await?;

        if reservation.status != ReservationStatus::CheckIn {
            warn!(
                "Check-out of {} rejected in status {}",
                reservation.reservation_code, reservation.status
            );
            return Err(AppError::InvalidTransition {
                action: "hacer check-out en".to_string(),
                status: reservation.status.to_string(),
            });
        }

        let patch = ReservationPatch {
            status: Some(ReservationStatus::Finalizada),
            ..Default::default()
        };

        let updated = self
            .reservation_repo
            .update_with_room_status(id, &patch, reservation.room_id, RoomStatus::Disponible)
            .await?;

        info!(code = %updated.reservation_code, "Guest checked out");
        Ok(updated)
    }

    /// Record the balance as settled
    ///
    /// A `Pendiente` reservation becomes `Confirmada`; later states keep
    /// their status so an in-house guest is not moved back.
    #[instrument(skip(self))]
    pub async fn finalize_payment(&self, id: Uuid) -> AppResult<Reservation> {
        let reservation = self.load_reservation(id).await?;

        let patch = ReservationPatch {
            payment_status: Some(PaymentStatus::Paid),
            deposit_amount: Some(reservation.total),
            paid_at: Some(Utc::now()),
            status: (reservation.status == ReservationStatus::Pendiente)
                .then_some(ReservationStatus::Confirmada),
            ..Default::default()
        };

        let updated = self.reservation_repo.update(id, &patch).await?;
        info!(
            code = %updated.reservation_code,
            status = %updated.status,
            "Payment settled"
        );
        Ok(updated)
    }

    /// Record a refund made outside the system
    #[instrument(skip(self))]
    pub async fn mark_refunded(&self, id: Uuid, amount: Decimal) -> AppResult<Reservation> {
        if amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "El monto devuelto no puede ser negativo".to_string(),
            ));
        }

        let reservation = self.load_reservation(id).await?;
        if reservation.payment_status != PaymentStatus::RefundPending {
            debug!(
                "Refund recorded for {} from payment status {}",
                reservation.reservation_code, reservation.payment_status
            );
        }

        let patch = ReservationPatch {
            payment_status: Some(PaymentStatus::Refunded),
            refund_amount: Some(amount),
            refunded_at: Some(Utc::now()),
            ..Default::default()
        };

        let updated = self.reservation_repo.update(id, &patch).await?;
        info!(code = %updated.reservation_code, amount = %amount, "Refund recorded");
        Ok(updated)
    }

    /// Joined detail view
    #[instrument(skip(self))]
    pub async fn get_reservation(&self, id: Uuid) -> AppResult<ReservationDetail> {
        self.reservation_repo
            .find_detail(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// All rows of a booking, ordered by code
    pub async fn booking_rows(&self, booking_id: Uuid) -> AppResult<Vec<Reservation>> {
        let rows = self.reservation_repo.find_by_booking(booking_id).await?;
        if rows.is_empty() {
            return Err(Self::not_found(booking_id));
        }
        Ok(rows)
    }

    pub async fn find_guest(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> AppResult<Option<Guest>> {
        self.guest_repo
            .find_by_document(document_type, document_number)
            .await
    }

    /// Guest looked up by document, with reservations newest first
    #[instrument(skip(self))]
    pub async fn guest_history(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> AppResult<GuestHistory> {
        let guest = self
            .find_guest(document_type, document_number)
            .await?
            .ok_or_else(|| {
                AppError::GuestNotFound(format!("{} {}", document_type, document_number))
            })?;
        let reservations = self.reservation_repo.find_by_guest_id(guest.id).await?;

        Ok(GuestHistory {
            guest,
            reservations,
        })
    }

    pub async fn guest_reservations(&self, guest_id: Uuid) -> AppResult<Vec<Reservation>> {
        if self.guest_repo.find_by_id(guest_id).await?.is_none() {
            return Err(AppError::GuestNotFound(guest_id.to_string()));
        }
        self.reservation_repo.find_by_guest_id(guest_id).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_guest(&self, id: Uuid, patch: &GuestPatch) -> AppResult<Guest> {
        if patch.is_empty() {
            return Err(AppError::Validation(
                "No hay campos para actualizar".to_string(),
            ));
        }
        let guest = self.guest_repo.update(id, patch).await?;
        info!("Guest {} updated", guest.id);
        Ok(guest)
    }

    /// Rooms free for the whole `[check_in, check_out)` range
    #[instrument(skip(self))]
    pub async fn search_availability(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: Option<i32>,
    ) -> AppResult<Vec<Room>> {
        validate_stay(check_in, check_out)?;
        self.room_repo
            .find_available(check_in, check_out, min_capacity)
            .await
    }

    pub async fn list_rooms(&self, status: Option<RoomStatus>) -> AppResult<Vec<Room>> {
        self.room_repo.list(status).await
    }

    pub async fn list_services(&self) -> AppResult<Vec<Service>> {
        self.catalog_repo.list_active().await
    }

    /// Live reservation of a room today, if any
    #[instrument(skip(self))]
    pub async fn active_reservation(&self, room_id: i32) -> AppResult<Option<Reservation>> {
        if self.room_repo.find_by_id(room_id).await?.is_none() {
            return Err(AppError::RoomNotFound(room_id.to_string()));
        }
        self.reservation_repo
            .find_active_by_room_id(room_id, self.today())
            .await
    }
}

/// Spread a booking deposit over its rows
///
/// The first room takes as much as its total allows; any remainder spills
/// onto the following rooms in order, so no row holds more than its total.
fn allocate_deposit(deposit: Decimal, room_totals: &[Decimal]) -> Vec<Decimal> {
    let mut remaining = deposit.max(Decimal::ZERO);
    room_totals
        .iter()
        .map(|total| {
            let share = remaining.min(*total);
            remaining -= share;
            share
        })
        .collect()
}

fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<i32> {
    let nights = nights_between(check_in, check_out);
    if nights < 1 {
        return Err(AppError::Validation(
            "La fecha de salida debe ser posterior a la de llegada".to_string(),
        ));
    }
    if nights > MAX_NIGHTS {
        return Err(AppError::Validation(format!(
            "La estadía no puede superar {} noches",
            MAX_NIGHTS
        )));
    }
    Ok(nights as i32)
}

fn validate_room_selection(room_ids: &[i32]) -> AppResult<()> {
    if room_ids.is_empty() {
        return Err(AppError::Validation(
            "Debe seleccionar al menos una habitación".to_string(),
        ));
    }
    if room_ids.len() > MAX_ROOMS_PER_BOOKING {
        return Err(AppError::Validation(format!(
            "No se pueden reservar más de {} habitaciones a la vez",
            MAX_ROOMS_PER_BOOKING
        )));
    }
    let unique: HashSet<i32> = room_ids.iter().copied().collect();
    if unique.len() != room_ids.len() {
        return Err(AppError::Validation(
            "Una habitación fue seleccionada más de una vez".to_string(),
        ));
    }
    Ok(())
}

fn validate_guest(guest: &NewGuest) -> AppResult<()> {
    if guest.document_number.trim().is_empty() {
        return Err(AppError::Validation(
            "El número de documento es obligatorio".to_string(),
        ));
    }
    if guest.first_name.trim().is_empty() || guest.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "El nombre y apellido del huésped son obligatorios".to_string(),
        ));
    }
    Ok(())
}

fn validate_code(code: &str) -> AppResult<()> {
    let valid = !code.is_empty()
        && code.len() <= 32
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::Validation(format!(
            "Código de reserva inválido: {}",
            code
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_stay() {
        assert_eq!(validate_stay(date(2026, 3, 1), date(2026, 3, 3)).unwrap(), 2);
        assert!(validate_stay(date(2026, 3, 3), date(2026, 3, 3)).is_err());
        assert!(validate_stay(date(2026, 3, 3), date(2026, 3, 1)).is_err());
        assert!(validate_stay(date(2026, 1, 1), date(2026, 12, 31)).is_err());
    }

    #[test]
    fn test_validate_room_selection() {
        assert!(validate_room_selection(&[1, 2]).is_ok());
        assert!(validate_room_selection(&[]).is_err());
        assert!(validate_room_selection(&[3, 3]).is_err());
    }

    #[test]
    fn test_allocate_deposit() {
        use rust_decimal_macros::dec;

        assert_eq!(
            allocate_deposit(dec!(12000), &[dec!(40000), dec!(20000)]),
            vec![dec!(12000), Decimal::ZERO]
        );
        assert_eq!(
            allocate_deposit(dec!(40000), &[dec!(30000), dec!(30000)]),
            vec![dec!(30000), dec!(10000)]
        );
        assert_eq!(
            allocate_deposit(dec!(60000), &[dec!(30000), dec!(30000)]),
            vec![dec!(30000), dec!(30000)]
        );
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("RES-260301-AB12CD").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("con espacio").is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = ReservationSettings::default();
        assert_eq!(settings.iva_percent, DEFAULT_IVA_PERCENT);
        assert_eq!(settings.timezone, chrono_tz::America::Santiago);
    }
}
