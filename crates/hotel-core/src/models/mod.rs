//! Domain models for the hotel back-office
//!
//! This module contains the core domain models shared by the db, services and api crates.

pub mod catalog;
pub mod guest;
pub mod incident;
pub mod profile;
pub mod reservation;
pub mod room;

pub use catalog::{NewServiceLine, Service, ServiceLineDetail};
pub use guest::{DocumentType, Guest, GuestPatch, NewGuest};
pub use incident::{Incident, IncidentCategory, IncidentClassification, IncidentPriority};
pub use profile::{Profile, StaffRole};
pub use reservation::{
    NewBooking, NewReservation, PaymentStatus, PaymentType, Reservation,
    ReservationDetail, ReservationPatch, ReservationStatus,
};
pub use room::{Room, RoomStatus};
