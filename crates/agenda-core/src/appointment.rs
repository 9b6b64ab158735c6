//! Appointment: a student booked into a psychologist's slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  id::{AppointmentId, PsychologistId, SlotId, StudentId},
  slot::Slot,
  status::Status,
};

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub appointment_id:  AppointmentId,
  pub student_id:      StudentId,
  pub psychologist_id: PsychologistId,
  pub slot_id:         SlotId,
  pub starts_at:       DateTime<Utc>,
  pub ends_at:         DateTime<Utc>,
  pub status:          Status,
  /// Set by the store on insert.
  pub created_at:      DateTime<Utc>,
}

/// Input for [`AppointmentStore::create`](crate::store::AppointmentStore::create).
///
/// There is no public way to build one with an arbitrary
/// psychologist or interval: both always come from the consumed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
  student_id:      StudentId,
  psychologist_id: PsychologistId,
  slot_id:         SlotId,
  starts_at:       DateTime<Utc>,
  ends_at:         DateTime<Utc>,
  status:          Status,
}

impl NewAppointment {
  /// A `Scheduled` appointment for `student_id` in `slot`.
  pub fn from_slot(slot: &Slot, student_id: StudentId) -> Self {
    Self {
      student_id,
      psychologist_id: slot.psychologist_id.clone(),
      slot_id:         slot.slot_id.clone(),
      starts_at:       slot.starts_at,
      ends_at:         slot.ends_at,
      status:          Status::Scheduled,
    }
  }

  pub fn student_id(&self) -> &StudentId { &self.student_id }

  pub fn psychologist_id(&self) -> &PsychologistId { &self.psychologist_id }

  pub fn slot_id(&self) -> &SlotId { &self.slot_id }

  pub fn starts_at(&self) -> DateTime<Utc> { self.starts_at }

  pub fn ends_at(&self) -> DateTime<Utc> { self.ends_at }

  pub fn status(&self) -> &Status { &self.status }

  /// Attach the store-assigned id and creation time.
  pub fn into_appointment(
    self,
    appointment_id: AppointmentId,
    created_at: DateTime<Utc>,
  ) -> Appointment {
    Appointment {
      appointment_id,
      student_id: self.student_id,
      psychologist_id: self.psychologist_id,
      slot_id: self.slot_id,
      starts_at: self.starts_at,
      ends_at: self.ends_at,
      status: self.status,
      created_at,
    }
  }
}
