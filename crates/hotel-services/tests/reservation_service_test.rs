//! Reservation lifecycle against in-memory repositories

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use hotel_core::models::{
    DocumentType, Guest, GuestPatch, NewBooking, NewGuest, NewReservation, NewServiceLine,
    PaymentStatus, PaymentType, Reservation, ReservationDetail, ReservationPatch,
    ReservationStatus, Room, RoomStatus, Service, ServiceLineDetail,
};
use hotel_core::traits::{
    GuestRepository, ReservationRepository, RoomRepository, ServiceCatalogRepository,
};
use hotel_core::{AppError, AppResult};
use hotel_services::{
    CreateReservationParams, ReservationService, ReservationSettings, ServiceSelection,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    guests: Mutex<Vec<Guest>>,
    rooms: Mutex<HashMap<i32, Room>>,
    services: Mutex<Vec<Service>>,
    reservations: Mutex<Vec<Reservation>>,
    service_lines: Mutex<Vec<NewServiceLine>>,
    companions: Mutex<Vec<(Uuid, Uuid)>>,
}

impl Store {
    fn with_rooms(rooms: &[(i32, Decimal)]) -> Self {
        let store = Store::default();
        {
            let mut map = store.rooms.lock().unwrap();
            for &(id, price) in rooms {
                map.insert(
                    id,
                    Room {
                        id,
                        number: format!("{}", 100 + id),
                        room_type: "Doble".to_string(),
                        capacity: 2,
                        base_price: price,
                        status: RoomStatus::Disponible,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    },
                );
            }
        }
        store.services.lock().unwrap().extend([
            Service {
                id: 1,
                name: "Desayuno".to_string(),
                unit_price: dec!(5000),
                active: true,
            },
            Service {
                id: 2,
                name: "Estacionamiento".to_string(),
                unit_price: dec!(3000),
                active: false,
            },
        ]);
        store
    }

    fn room_status(&self, id: i32) -> RoomStatus {
        self.rooms.lock().unwrap()[&id].status
    }

    fn set_room_status(&self, id: i32, status: RoomStatus) {
        if let Some(room) = self.rooms.lock().unwrap().get_mut(&id) {
            room.status = status;
        }
    }

    fn reservation(&self, id: Uuid) -> Reservation {
        self.reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .unwrap()
    }

    fn patch(&self, id: Uuid, patch: &ReservationPatch) -> AppResult<Reservation> {
        let mut rows = self.reservations.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;
        patch.apply_to(row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl GuestRepository for Store {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Guest>> {
        Ok(self.guests.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_document(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> AppResult<Option<Guest>> {
        let number = document_type.normalize_number(document_number);
        Ok(self
            .guests
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.document_type == document_type && g.document_number == number)
            .cloned())
    }

    async fn create(&self, guest: &NewGuest) -> AppResult<Guest> {
        let number = guest.document_type.normalize_number(&guest.document_number);
        let mut guests = self.guests.lock().unwrap();
        if guests
            .iter()
            .any(|g| g.document_type == guest.document_type && g.document_number == number)
        {
            return Err(AppError::DuplicateDocument {
                document_type: guest.document_type.to_string(),
                document_number: number,
            });
        }
        let created = Guest {
            id: Uuid::new_v4(),
            document_type: guest.document_type,
            document_number: number,
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            country: guest.country.clone(),
            city: guest.city.clone(),
            birth_date: guest.birth_date,
            email: guest.email.clone(),
            phone: guest.phone.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        guests.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &GuestPatch) -> AppResult<Guest> {
        let mut guests = self.guests.lock().unwrap();
        let guest = guests
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::GuestNotFound(id.to_string()))?;
        patch.apply_to(guest);
        Ok(guest.clone())
    }
}

#[async_trait]
impl RoomRepository for Store {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Room>> {
        Ok(self.rooms.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Room>> {
        let rooms = self.rooms.lock().unwrap();
        let mut found: Vec<Room> = ids.iter().filter_map(|id| rooms.get(id).cloned()).collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn update_status(&self, id: i32, status: RoomStatus) -> AppResult<()> {
        self.set_room_status(id, status);
        Ok(())
    }

    async fn list(&self, status: Option<RoomStatus>) -> AppResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self
            .rooms
            .lock()
            .unwrap()
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    async fn find_available(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: Option<i32>,
    ) -> AppResult<Vec<Room>> {
        let reservations = self.reservations.lock().unwrap();
        let mut rooms: Vec<Room> = self
            .rooms
            .lock()
            .unwrap()
            .values()
            .filter(|room| min_capacity.map_or(true, |c| room.capacity >= c))
            .filter(|room| {
                !reservations.iter().any(|r| {
                    r.room_id == room.id
                        && r.status.is_active()
                        && r.check_in < check_out
                        && check_in < r.check_out
                })
            })
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }
}

#[async_trait]
impl ReservationRepository for Store {
    async fn create(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        let row = reservation.clone().into_reservation(Utc::now());
        self.reservations.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn add_services(&self, lines: &[NewServiceLine]) -> AppResult<u64> {
        self.service_lines.lock().unwrap().extend_from_slice(lines);
        Ok(lines.len() as u64)
    }

    async fn create_booking(&self, booking: &NewBooking) -> AppResult<Vec<Reservation>> {
        let now = Utc::now();
        let rows: Vec<Reservation> = booking
            .reservations
            .iter()
            .cloned()
            .map(|r| r.into_reservation(now))
            .collect();
        self.reservations.lock().unwrap().extend(rows.iter().cloned());
        self.service_lines
            .lock()
            .unwrap()
            .extend(booking.services.iter().cloned());
        let primary = rows[0].id;
        self.companions
            .lock()
            .unwrap()
            .extend(booking.companions.iter().map(|g| (primary, *g)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> AppResult<Option<ReservationDetail>> {
        let Some(reservation) = ReservationRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };
        let guest = GuestRepository::find_by_id(self, reservation.guest_id)
            .await?
            .ok_or_else(|| AppError::GuestNotFound(reservation.guest_id.to_string()))?;
        let room = RoomRepository::find_by_id(self, reservation.room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(reservation.room_id.to_string()))?;
        let catalog = self.services.lock().unwrap().clone();
        let services = self
            .service_lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.reservation_id == id)
            .map(|l| ServiceLineDetail {
                id: Uuid::new_v4(),
                service_id: l.service_id,
                service_name: catalog
                    .iter()
                    .find(|s| s.id == l.service_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect();
        let companion_ids: Vec<Uuid> = self
            .companions
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == id)
            .map(|(_, g)| *g)
            .collect();
        let companions = self
            .guests
            .lock()
            .unwrap()
            .iter()
            .filter(|g| companion_ids.contains(&g.id))
            .cloned()
            .collect();

        Ok(Some(ReservationDetail {
            reservation,
            guest,
            room,
            creator: None,
            services,
            companions,
        }))
    }

    async fn find_by_guest_id(&self, guest_id: Uuid) -> AppResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.guest_id == guest_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.check_in.cmp(&a.check_in));
        Ok(rows)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.booking_id == booking_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.reservation_code.len(), &a.reservation_code)
                .cmp(&(b.reservation_code.len(), &b.reservation_code))
        });
        Ok(rows)
    }

    async fn update(&self, id: Uuid, patch: &ReservationPatch) -> AppResult<Reservation> {
        self.patch(id, patch)
    }

    async fn update_with_room_status(
        &self,
        id: Uuid,
        patch: &ReservationPatch,
        room_id: i32,
        room_status: RoomStatus,
    ) -> AppResult<Reservation> {
        let updated = self.patch(id, patch)?;
        self.set_room_status(room_id, room_status);
        Ok(updated)
    }

    async fn find_active_by_room_id(
        &self,
        room_id: i32,
        today: NaiveDate,
    ) -> AppResult<Option<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.room_id == room_id && r.status.is_active() && r.covers(today))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.status.to_string(), a.check_in).cmp(&(b.status.to_string(), b.check_in))
        });
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ServiceCatalogRepository for Store {
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Service>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn list_active(&self) -> AppResult<Vec<Service>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }
}

type TestService = ReservationService<Store, Store, Store, Store>;

fn service(store: &Arc<Store>) -> TestService {
    ReservationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        ReservationSettings::default(),
    )
}

fn guest(document: &str, email: Option<&str>) -> NewGuest {
    NewGuest {
        document_type: DocumentType::Rut,
        document_number: document.to_string(),
        first_name: "Valentina".to_string(),
        last_name: "Rojas".to_string(),
        country: Some("Chile".to_string()),
        city: Some("Valparaíso".to_string()),
        birth_date: None,
        email: email.map(str::to_string),
        phone: Some("+56 9 8765 4321".to_string()),
    }
}

fn params(room_ids: Vec<i32>, check_in: NaiveDate, nights: i64) -> CreateReservationParams {
    CreateReservationParams {
        guest: guest("12.345.678-5", Some("valentina@example.cl")),
        companions: Vec::new(),
        room_ids,
        check_in,
        check_out: check_in + Duration::days(nights),
        services: Vec::new(),
        discount_percent: Decimal::ZERO,
        payment_type: PaymentType::Partial,
        deposit_amount: None,
        notes: None,
        created_by: None,
        code: None,
    }
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[tokio::test]
async fn test_two_night_partial_booking() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], march(10), 2);
    p.deposit_amount = Some(dec!(18000));

    let confirmation = svc.create_reservation(p).await.unwrap();

    assert_eq!(confirmation.total, dec!(60000));
    assert_eq!(confirmation.nights, 2);
    assert_eq!(confirmation.deposit_amount, dec!(18000));
    assert_eq!(confirmation.pending_balance, dec!(42000));
    assert!(confirmation.code.starts_with("RES-"));

    let row = &confirmation.rooms[0].reservation;
    assert_eq!(row.total, dec!(60000));
    assert_eq!(row.subtotal_net, dec!(50420));
    assert_eq!(row.iva_amount, dec!(9580));
    assert_eq!(row.status, ReservationStatus::Pendiente);
    assert_eq!(row.payment_status, PaymentStatus::Partial);
    assert_eq!(row.deposit_amount, dec!(18000));
    assert_eq!(row.reservation_code, confirmation.code);
    assert_eq!(store.room_status(1), RoomStatus::Disponible);
}

#[tokio::test]
async fn test_partial_deposit_defaults_to_configured_percentage() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let confirmation = svc
        .create_reservation(params(vec![1], march(10), 2))
        .await
        .unwrap();

    assert_eq!(confirmation.deposit_amount, dec!(18000));
}

#[tokio::test]
async fn test_full_payment_confirms_every_room() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000)), (2, dec!(20000))]));
    let svc = service(&store);

    let mut p = params(vec![1, 2], march(10), 1);
    p.payment_type = PaymentType::Full;

    let confirmation = svc.create_reservation(p).await.unwrap();

    assert_eq!(confirmation.pending_balance, Decimal::ZERO);
    for line in &confirmation.rooms {
        assert_eq!(line.reservation.status, ReservationStatus::Confirmada);
        assert_eq!(line.reservation.payment_status, PaymentStatus::Paid);
        assert_eq!(line.reservation.deposit_amount, line.reservation.total);
        assert!(line.reservation.paid_at.is_some());
    }
}

#[tokio::test]
async fn test_multi_room_codes_and_services_on_first_room() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000)), (2, dec!(20000))]));
    let svc = service(&store);

    let mut p = params(vec![1, 2], march(10), 1);
    p.code = Some("HX2026".to_string());
    p.services = vec![ServiceSelection {
        service_id: 1,
        quantity: 2,
    }];
    p.deposit_amount = Some(dec!(12000));

    let confirmation = svc.create_reservation(p).await.unwrap();

    let first = &confirmation.rooms[0].reservation;
    let second = &confirmation.rooms[1].reservation;
    assert_eq!(first.reservation_code, "HX2026");
    assert_eq!(second.reservation_code, "HX2026-1");
    assert_eq!(first.booking_id, second.booking_id);
    assert_eq!(first.total, dec!(40000));
    assert_eq!(second.total, dec!(20000));
    assert_eq!(first.deposit_amount, dec!(12000));
    assert_eq!(second.deposit_amount, Decimal::ZERO);
    assert_eq!(confirmation.total, dec!(60000));

    let lines = store.service_lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines.iter().all(|l| l.reservation_id == first.id));
    assert_eq!(lines[0].unit_price, dec!(5000));

    let siblings = svc.booking_rows(first.booking_id).await.unwrap();
    let codes: Vec<&str> = siblings.iter().map(|r| r.reservation_code.as_str()).collect();
    assert_eq!(codes, vec!["HX2026", "HX2026-1"]);
}

#[tokio::test]
async fn test_deposit_larger_than_first_room_spills_to_siblings() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000)), (2, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1, 2], march(10), 1);
    p.deposit_amount = Some(dec!(40000));

    let confirmation = svc.create_reservation(p).await.unwrap();
    assert_eq!(confirmation.total, dec!(60000));
    assert_eq!(confirmation.deposit_amount, dec!(40000));
    assert_eq!(confirmation.pending_balance, dec!(20000));
    assert_eq!(
        confirmation.deposit_amount + confirmation.pending_balance,
        confirmation.total
    );

    let first = &confirmation.rooms[0].reservation;
    let second = &confirmation.rooms[1].reservation;
    assert_eq!(first.deposit_amount, dec!(30000));
    assert_eq!(second.deposit_amount, dec!(10000));
    assert!(!first.has_pending_balance());
    assert_eq!(second.pending_balance(), dec!(20000));
}

#[tokio::test]
async fn test_repeated_service_quantity_cannot_overflow() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], march(10), 1);
    p.services = vec![
        ServiceSelection {
            service_id: 1,
            quantity: i32::MAX,
        },
        ServiceSelection {
            service_id: 1,
            quantity: 1,
        },
    ];
    assert!(matches!(
        svc.create_reservation(p).await,
        Err(AppError::Validation(_))
    ));

    let mut merged = params(vec![1], march(10), 1);
    merged.services = vec![
        ServiceSelection {
            service_id: 1,
            quantity: 600,
        },
        ServiceSelection {
            service_id: 1,
            quantity: 600,
        },
    ];
    assert!(matches!(
        svc.create_reservation(merged).await,
        Err(AppError::Validation(_))
    ));

    assert!(store.reservations.lock().unwrap().is_empty());
    assert!(store.guests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_discount_applies_to_each_room() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], march(10), 2);
    p.discount_percent = dec!(10);

    let confirmation = svc.create_reservation(p).await.unwrap();
    assert_eq!(confirmation.total, dec!(54000));
    assert_eq!(confirmation.rooms[0].reservation.discount_percent, dec!(10));
}

#[tokio::test]
async fn test_returning_guest_contact_is_refreshed() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000)), (2, dec!(30000))]));
    let svc = service(&store);

    let mut first = params(vec![1], march(10), 1);
    first.guest = guest("12345678-5", Some("old@example.cl"));
    svc.create_reservation(first).await.unwrap();

    let mut second = params(vec![2], march(20), 1);
    second.guest = guest("12.345.678-5", Some("new@example.cl"));
    svc.create_reservation(second).await.unwrap();

    let guests = store.guests.lock().unwrap();
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].email.as_deref(), Some("new@example.cl"));
}

#[tokio::test]
async fn test_companions_linked_to_primary_row() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], march(10), 1);
    let mut companion = guest("P1234567", None);
    companion.document_type = DocumentType::Pasaporte;
    companion.first_name = "Lucas".to_string();
    p.companions = vec![companion.clone(), companion, p.guest.clone()];

    let confirmation = svc.create_reservation(p).await.unwrap();
    assert_eq!(confirmation.companions.len(), 1);

    let detail = svc
        .get_reservation(confirmation.rooms[0].reservation.id)
        .await
        .unwrap();
    assert_eq!(detail.companions.len(), 1);
    assert_eq!(detail.companions[0].first_name, "Lucas");
}

#[tokio::test]
async fn test_booking_validation() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let same_day = params(vec![1], march(10), 0);
    assert!(matches!(
        svc.create_reservation(same_day).await,
        Err(AppError::Validation(_))
    ));

    let unknown_room = params(vec![1, 99], march(10), 1);
    assert!(matches!(
        svc.create_reservation(unknown_room).await,
        Err(AppError::RoomNotFound(_))
    ));

    let mut inactive_service = params(vec![1], march(10), 1);
    inactive_service.services = vec![ServiceSelection {
        service_id: 2,
        quantity: 1,
    }];
    assert!(matches!(
        svc.create_reservation(inactive_service).await,
        Err(AppError::NotFound(_))
    ));

    let mut too_much = params(vec![1], march(10), 1);
    too_much.deposit_amount = Some(dec!(30001));
    assert!(matches!(
        svc.create_reservation(too_much).await,
        Err(AppError::Validation(_))
    ));

    assert!(store.guests.lock().unwrap().is_empty());
    assert!(store.reservations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_in_with_pending_balance_changes_nothing() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let confirmation = svc
        .create_reservation(params(vec![1], svc.today(), 2))
        .await
        .unwrap();
    let id = confirmation.rooms[0].reservation.id;
    let before = store.reservation(id);

    let result = svc.perform_check_in(id).await;

    assert!(matches!(result, Err(AppError::PendingBalance { .. })));
    assert_eq!(store.reservation(id), before);
    assert_eq!(store.room_status(1), RoomStatus::Disponible);
}

#[tokio::test]
async fn test_check_in_after_settlement() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);
    let booked = svc.today() - Duration::days(1);

    let confirmation = svc
        .create_reservation(params(vec![1], booked, 3))
        .await
        .unwrap();
    let id = confirmation.rooms[0].reservation.id;

    let settled = svc.finalize_payment(id).await.unwrap();
    assert_eq!(settled.payment_status, PaymentStatus::Paid);
    assert_eq!(settled.status, ReservationStatus::Confirmada);
    assert!(settled.paid_at.is_some());

    let checked_in = svc.perform_check_in(id).await.unwrap();
    assert_eq!(checked_in.status, ReservationStatus::CheckIn);
    assert_eq!(checked_in.check_in, svc.today());
    assert_eq!(checked_in.original_check_in, Some(booked));
    assert_eq!(store.room_status(1), RoomStatus::Ocupada);

    let active = svc.active_reservation(1).await.unwrap();
    assert_eq!(active.map(|r| r.id), Some(id));

    assert!(matches!(
        svc.perform_check_in(id).await,
        Err(AppError::AlreadyCheckedIn(_))
    ));
}

#[tokio::test]
async fn test_check_in_rejects_occupied_room() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], svc.today(), 1);
    p.payment_type = PaymentType::Full;
    let id = svc.create_reservation(p).await.unwrap().rooms[0].reservation.id;
    store.set_room_status(1, RoomStatus::Ocupada);
    let before = store.reservation(id);

    assert!(matches!(
        svc.perform_check_in(id).await,
        Err(AppError::RoomOccupied(_))
    ));
    assert_eq!(store.reservation(id), before);
}

#[tokio::test]
async fn test_check_out_flow() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], svc.today(), 2);
    p.payment_type = PaymentType::Full;
    let id = svc.create_reservation(p).await.unwrap().rooms[0].reservation.id;

    assert!(matches!(
        svc.perform_check_out(id).await,
        Err(AppError::InvalidTransition { .. })
    ));

    svc.perform_check_in(id).await.unwrap();
    let finished = svc.perform_check_out(id).await.unwrap();

    assert_eq!(finished.status, ReservationStatus::Finalizada);
    assert_eq!(store.room_status(1), RoomStatus::Disponible);
    assert!(matches!(
        svc.cancel_reservation(id).await,
        Err(AppError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_cancel_paid_stay_releases_room() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], svc.today(), 2);
    p.payment_type = PaymentType::Full;
    let id = svc.create_reservation(p).await.unwrap().rooms[0].reservation.id;
    svc.perform_check_in(id).await.unwrap();

    let cancelled = svc.cancel_reservation(id).await.unwrap();

    assert_eq!(cancelled.status, ReservationStatus::Cancelada);
    assert_eq!(cancelled.payment_status, PaymentStatus::RefundPending);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(store.room_status(1), RoomStatus::Disponible);
}

#[tokio::test]
async fn test_cancel_before_arrival_leaves_room_alone() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let id = svc
        .create_reservation(params(vec![1], march(10), 2))
        .await
        .unwrap()
        .rooms[0]
        .reservation
        .id;
    store.set_room_status(1, RoomStatus::Ocupada);

    let cancelled = svc.cancel_reservation(id).await.unwrap();

    assert_eq!(cancelled.payment_status, PaymentStatus::Retained);
    assert_eq!(store.room_status(1), RoomStatus::Ocupada);

    assert!(matches!(
        svc.cancel_reservation(id).await,
        Err(AppError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_mark_refunded() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);

    let mut p = params(vec![1], march(10), 1);
    p.payment_type = PaymentType::Full;
    let id = svc.create_reservation(p).await.unwrap().rooms[0].reservation.id;
    svc.cancel_reservation(id).await.unwrap();

    assert!(matches!(
        svc.mark_refunded(id, dec!(-1)).await,
        Err(AppError::Validation(_))
    ));

    let refunded = svc.mark_refunded(id, dec!(30000)).await.unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.refund_amount, Some(dec!(30000)));
    assert!(refunded.refunded_at.is_some());
}

#[tokio::test]
async fn test_unknown_reservation() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000))]));
    let svc = service(&store);
    let id = Uuid::new_v4();

    assert!(matches!(
        svc.cancel_reservation(id).await,
        Err(AppError::ReservationNotFound(_))
    ));
    assert!(matches!(
        svc.perform_check_in(id).await,
        Err(AppError::ReservationNotFound(_))
    ));
    assert!(matches!(
        svc.get_reservation(id).await,
        Err(AppError::ReservationNotFound(_))
    ));
}

#[tokio::test]
async fn test_guest_history_and_availability() {
    let store = Arc::new(Store::with_rooms(&[(1, dec!(30000)), (2, dec!(25000))]));
    let svc = service(&store);

    svc.create_reservation(params(vec![1], march(10), 2))
        .await
        .unwrap();
    svc.create_reservation(params(vec![2], march(20), 1))
        .await
        .unwrap();

    let history = svc
        .guest_history(DocumentType::Rut, "12.345.678-5")
        .await
        .unwrap();
    assert_eq!(history.reservations.len(), 2);
    assert_eq!(history.reservations[0].check_in, march(20));

    let free = svc
        .search_availability(march(11), march(12), None)
        .await
        .unwrap();
    assert_eq!(free.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

    // Departure day is free for a new arrival
    let free = svc
        .search_availability(march(12), march(13), None)
        .await
        .unwrap();
    assert_eq!(free.len(), 2);

    assert!(matches!(
        svc.guest_history(DocumentType::Pasaporte, "X999").await,
        Err(AppError::GuestNotFound(_))
    ));
}
