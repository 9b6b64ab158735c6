//! Storage and directory traits.
//!
//! The traits are implemented by storage backends (e.g. `agenda-store-sqlite`).
//! The booking service and the notification dispatcher depend on these
//! abstractions, not on any concrete backend.
//!
//! Absence is a value, not an error: lookups return `Option`, conditional
//! writes return [`Consumption`] or `bool`. An `Err` from any of these methods
//! always means the backend itself failed.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  appointment::{Appointment, NewAppointment},
  id::{AppointmentId, PartyId, PsychologistId, SlotId, StudentId},
  party::{Contact, PartyKind},
  slot::Slot,
  status::Status,
};

// ─── Outcome type ────────────────────────────────────────────────────────────

/// Result of a conditional slot consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consumption<T> {
  /// The slot was available and is now consumed.
  Consumed(T),
  /// The slot exists but was consumed by someone else first.
  Taken,
  /// No slot with that id exists.
  Missing,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Shared error type for a backend holding slots and appointments.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

/// Owns the bookable slots.
pub trait SlotStore: Store {
  /// The slot, if it exists and has not been consumed.
  fn get_available(
    &self,
    id: SlotId,
  ) -> impl Future<Output = Result<Option<Slot>, Self::Error>> + Send + '_;

  /// Atomically flip an available slot to consumed and return it.
  ///
  /// Must be linearizable: of any number of concurrent callers for the same
  /// id, at most one observes [`Consumption::Consumed`].
  fn consume_if_available(
    &self,
    id: SlotId,
  ) -> impl Future<Output = Result<Consumption<Slot>, Self::Error>> + Send + '_;

  /// Make a consumed slot available again. Returns `false` if the slot does
  /// not exist. Only used to undo a booking whose appointment write failed.
  fn release(
    &self,
    id: SlotId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Owns appointments and their status.
pub trait AppointmentStore: Store {
  /// Persist a new appointment. The id and `created_at` are set by the store.
  fn create(
    &self,
    input: NewAppointment,
  ) -> impl Future<Output = Result<Appointment, Self::Error>> + Send + '_;

  fn get(
    &self,
    id: AppointmentId,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  /// Appointments with a psychologist, optionally narrowed to one status
  /// (exact match). Ordered by start time.
  fn list_by_psychologist(
    &self,
    id: PsychologistId,
    status: Option<Status>,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  /// Appointments of a student, ordered by start time.
  fn list_by_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  /// Overwrite the status. Returns `false` if the appointment does not exist.
  fn update_status(
    &self,
    id: AppointmentId,
    status: Status,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove the appointment. Returns `false` if it does not exist.
  fn delete(
    &self,
    id: AppointmentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// A backend that can turn a slot into an appointment as one unit.
///
/// The provided [`book_slot`](BookingStore::book_slot) consumes the slot, then
/// creates the appointment, and releases the slot again if the create fails.
/// It is not cancellation safe: dropping the future between the two writes
/// leaves the slot consumed. Backends with real transactions should override
/// it so both writes commit or roll back together, and report that through
/// [`transactional_booking`](BookingStore::transactional_booking).
pub trait BookingStore: SlotStore + AppointmentStore {
  /// `true` when [`book_slot`](BookingStore::book_slot) commits the consume
  /// and the create together, so dropping it mid-way cannot strand a slot.
  fn transactional_booking(&self) -> bool { false }

  fn book_slot(
    &self,
    slot_id: SlotId,
    student_id: StudentId,
  ) -> impl Future<Output = Result<Consumption<Appointment>, Self::Error>> + Send + '_
  {
    async move {
      let slot = match self.consume_if_available(slot_id.clone()).await? {
        Consumption::Consumed(slot) => slot,
        Consumption::Taken => return Ok(Consumption::Taken),
        Consumption::Missing => return Ok(Consumption::Missing),
      };

      match self.create(NewAppointment::from_slot(&slot, student_id)).await {
        Ok(appointment) => Ok(Consumption::Consumed(appointment)),
        Err(create_err) => {
          if let Err(release_err) = self.release(slot_id.clone()).await {
            tracing::error!(
              slot_id = %slot_id,
              error = %release_err,
              "slot left consumed without an appointment; release failed"
            );
          }
          Err(create_err)
        }
      }
    }
  }
}

/// Read-only lookup of party display attributes.
pub trait PartyDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn resolve_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  fn resolve_psychologist(
    &self,
    id: PsychologistId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Which kind of party `id` is, if any. Psychologists are checked first.
  fn resolve_role(
    &self,
    id: PartyId,
  ) -> impl Future<Output = Result<Option<PartyKind>, Self::Error>> + Send + '_ {
    async move {
      if self.resolve_psychologist(PsychologistId::from(&id)).await?.is_some() {
        return Ok(Some(PartyKind::Psychologist));
      }
      if self.resolve_student(StudentId::from(&id)).await?.is_some() {
        return Ok(Some(PartyKind::Student));
      }
      Ok(None)
    }
  }
}
