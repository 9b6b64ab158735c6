//! The booking service.

use std::{future::Future, sync::Arc, time::Duration};

use agenda_core::{
  appointment::{Appointment, NewAppointment},
  id::{AppointmentId, PartyId, PsychologistId, SlotId, StudentId},
  party::PartyKind,
  status::Status,
  store::{BookingStore, Consumption, PartyDirectory},
};
use tracing::{error, info, warn};

use crate::{Error, Notifier, Result};

/// Default deadline for a single store call.
///
/// The deadline bounds the wait, not the store. A transactional booking that
/// times out may still commit on the store's side; the caller then sees
/// [`Error::Timeout`], a retry sees [`Error::Conflict`], and no booking
/// notification is sent. That case is logged at `warn` with the slot id.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Books slots and manages the resulting appointments.
///
/// Every state change commits first and notifies second; the [`Notifier`] is
/// handed the committed record and its outcome never reaches the caller.
pub struct Booking<S, N> {
  store:         Arc<S>,
  notifier:      N,
  store_timeout: Duration,
}

impl<S: BookingStore, N: Notifier> Booking<S, N> {
  pub fn new(store: Arc<S>, notifier: N) -> Self {
    Self { store, notifier, store_timeout: DEFAULT_STORE_TIMEOUT }
  }

  /// Replace the per-call store deadline.
  pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
    self.store_timeout = timeout;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn notifier(&self) -> &N { &self.notifier }

  /// Book `slot_id` for `student_id`.
  ///
  /// Of any number of concurrent calls for the same slot exactly one
  /// succeeds; the others get [`Error::Conflict`].
  pub async fn book(
    &self,
    student_id: StudentId,
    slot_id: SlotId,
  ) -> Result<Appointment> {
    require(&student_id, "student_id")?;
    require(&slot_id, "slot_id")?;

    let outcome = if self.store.transactional_booking() {
      self.book_in_one_step(&slot_id, &student_id).await?
    } else {
      self.book_in_steps(&slot_id, &student_id).await?
    };

    let appointment = match outcome {
      Consumption::Consumed(appointment) => appointment,
      Consumption::Taken => {
        return Err(Error::Conflict(format!("slot {slot_id} is already booked")));
      }
      Consumption::Missing => {
        return Err(Error::NotFound(format!("slot {slot_id} does not exist")));
      }
    };

    info!(
      appointment_id = %appointment.appointment_id,
      slot_id = %slot_id,
      student_id = %student_id,
      "appointment booked"
    );
    self.notifier.booked(&appointment);
    Ok(appointment)
  }

  /// One bounded call to a store that commits consume and create together.
  async fn book_in_one_step(
    &self,
    slot_id: &SlotId,
    student_id: &StudentId,
  ) -> Result<Consumption<Appointment>> {
    let outcome = self
      .bounded("book_slot", self.store.book_slot(slot_id.clone(), student_id.clone()))
      .await;
    if let Err(Error::Timeout(_)) = &outcome {
      warn!(
        slot_id = %slot_id,
        student_id = %student_id,
        "booking timed out; the store may still commit it, without a notification"
      );
    }
    outcome
  }

  /// Consume and create as separate bounded calls. If the create fails or
  /// runs out of time the slot is released before the error is returned.
  async fn book_in_steps(
    &self,
    slot_id: &SlotId,
    student_id: &StudentId,
  ) -> Result<Consumption<Appointment>> {
    let consumed = self
      .bounded("consume_if_available", self.store.consume_if_available(slot_id.clone()))
      .await?;
    let slot = match consumed {
      Consumption::Consumed(slot) => slot,
      Consumption::Taken => return Ok(Consumption::Taken),
      Consumption::Missing => return Ok(Consumption::Missing),
    };

    let input = NewAppointment::from_slot(&slot, student_id.clone());
    let err = match self.bounded("create", self.store.create(input)).await {
      Ok(appointment) => return Ok(Consumption::Consumed(appointment)),
      Err(e) => e,
    };

    match self.bounded("release", self.store.release(slot_id.clone())).await {
      Ok(_) => warn!(slot_id = %slot_id, error = %err, "appointment write failed; slot released"),
      Err(release_err) => error!(
        slot_id = %slot_id,
        error = %release_err,
        "slot left consumed without an appointment; release failed"
      ),
    }
    Err(err)
  }

  pub async fn get(&self, appointment_id: AppointmentId) -> Result<Appointment> {
    require(&appointment_id, "appointment_id")?;
    self
      .bounded("get", self.store.get(appointment_id.clone()))
      .await?
      .ok_or_else(|| appointment_not_found(&appointment_id))
  }

  /// Appointments with a psychologist. A blank `status` means no filter;
  /// otherwise only appointments whose status equals it are returned.
  pub async fn list_by_psychologist(
    &self,
    psychologist_id: PsychologistId,
    status: Option<&str>,
  ) -> Result<Vec<Appointment>> {
    require(&psychologist_id, "psychologist_id")?;
    let status = status
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::parse::<Status>)
      .transpose()?;

    self
      .bounded(
        "list_by_psychologist",
        self.store.list_by_psychologist(psychologist_id, status),
      )
      .await
  }

  pub async fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Appointment>> {
    require(&student_id, "student_id")?;
    self
      .bounded("list_by_student", self.store.list_by_student(student_id))
      .await
  }

  /// Overwrite the status of an appointment. Any well-formed label is
  /// accepted from any current status.
  pub async fn change_status(
    &self,
    appointment_id: AppointmentId,
    status: &str,
  ) -> Result<Status> {
    require(&appointment_id, "appointment_id")?;
    let status: Status = status.parse()?;

    let updated = self
      .bounded(
        "update_status",
        self.store.update_status(appointment_id.clone(), status.clone()),
      )
      .await?;
    if !updated {
      return Err(appointment_not_found(&appointment_id));
    }

    info!(appointment_id = %appointment_id, status = %status, "appointment status changed");
    self.notifier.status_changed(&appointment_id, &status);
    Ok(status)
  }

  /// Delete an appointment. The slot stays consumed.
  pub async fn cancel(&self, appointment_id: AppointmentId) -> Result<()> {
    require(&appointment_id, "appointment_id")?;
    let deleted = self
      .bounded("delete", self.store.delete(appointment_id.clone()))
      .await?;
    if !deleted {
      return Err(appointment_not_found(&appointment_id));
    }

    info!(appointment_id = %appointment_id, "appointment deleted");
    Ok(())
  }
}

impl<S: BookingStore + PartyDirectory, N: Notifier> Booking<S, N> {
  /// Whether `party_id` is a psychologist, a student or unknown.
  pub async fn resolve_role(&self, party_id: PartyId) -> Result<Option<PartyKind>> {
    require(&party_id, "user id")?;
    self
      .bounded("resolve_role", self.store.resolve_role(party_id))
      .await
  }
}

impl<S, N> Booking<S, N> {
  /// Run a store call under the deadline, mapping backend failures to
  /// [`Error::Internal`] and an elapsed deadline to [`Error::Timeout`].
  async fn bounded<T, E>(
    &self,
    operation: &'static str,
    call: impl Future<Output = Result<T, E>>,
  ) -> Result<T>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match tokio::time::timeout(self.store_timeout, call).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => {
        error!(operation, error = %e, "store call failed");
        Err(Error::Internal(Box::new(e)))
      }
      Err(_) => {
        warn!(operation, timeout = ?self.store_timeout, "store call timed out");
        Err(Error::Timeout(self.store_timeout))
      }
    }
  }
}

fn require(id: &impl AsRef<str>, field: &str) -> Result<()> {
  if id.as_ref().trim().is_empty() {
    return Err(Error::InvalidArgument(format!("{field} is required")));
  }
  Ok(())
}

fn appointment_not_found(id: &AppointmentId) -> Error {
  Error::NotFound(format!("appointment {id} does not exist"))
}
