//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC. Statuses are stored
//! as their label; ids verbatim.

use agenda_core::{
  appointment::Appointment,
  id::{AppointmentId, PsychologistId, SlotId, StudentId},
  party::{Contact, PartyKind},
  slot::Slot,
  status::Status,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

// Fixed width so that string order equals chronological order in ORDER BY.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PartyKind ───────────────────────────────────────────────────────────────

pub fn encode_party_kind(k: PartyKind) -> &'static str {
  match k {
    PartyKind::Student => "student",
    PartyKind::Psychologist => "psychologist",
  }
}

pub fn decode_party_kind(s: &str) -> Result<PartyKind> {
  match s {
    "student" => Ok(PartyKind::Student),
    "psychologist" => Ok(PartyKind::Psychologist),
    other => Err(Error::UnknownPartyKind(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SLOT_COLUMNS: &str =
  "slot_id, psychologist_id, starts_at, ends_at, available";

pub const APPOINTMENT_COLUMNS: &str = "appointment_id, student_id, \
   psychologist_id, slot_id, starts_at, ends_at, status, created_at";

/// Raw values read directly from a `slots` row.
pub struct RawSlot {
  pub slot_id:         String,
  pub psychologist_id: String,
  pub starts_at:       String,
  pub ends_at:         String,
  pub available:       bool,
}

impl RawSlot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSlot {
      slot_id:         row.get(0)?,
      psychologist_id: row.get(1)?,
      starts_at:       row.get(2)?,
      ends_at:         row.get(3)?,
      available:       row.get(4)?,
    })
  }

  pub fn into_slot(self) -> Result<Slot> {
    Ok(Slot {
      slot_id:         SlotId::from(self.slot_id),
      psychologist_id: PsychologistId::from(self.psychologist_id),
      starts_at:       decode_dt(&self.starts_at)?,
      ends_at:         decode_dt(&self.ends_at)?,
      available:       self.available,
    })
  }
}

/// Raw strings read directly from an `appointments` row.
pub struct RawAppointment {
  pub appointment_id:  String,
  pub student_id:      String,
  pub psychologist_id: String,
  pub slot_id:         String,
  pub starts_at:       String,
  pub ends_at:         String,
  pub status:          String,
  pub created_at:      String,
}

impl RawAppointment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAppointment {
      appointment_id:  row.get(0)?,
      student_id:      row.get(1)?,
      psychologist_id: row.get(2)?,
      slot_id:         row.get(3)?,
      starts_at:       row.get(4)?,
      ends_at:         row.get(5)?,
      status:          row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      appointment_id:  AppointmentId::from(self.appointment_id),
      student_id:      StudentId::from(self.student_id),
      psychologist_id: PsychologistId::from(self.psychologist_id),
      slot_id:         SlotId::from(self.slot_id),
      starts_at:       decode_dt(&self.starts_at)?,
      ends_at:         decode_dt(&self.ends_at)?,
      status:          self.status.parse::<Status>()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from the `name, email` columns of a `parties` row.
pub struct RawContact {
  pub name:  String,
  pub email: String,
}

impl RawContact {
  pub fn into_contact(self) -> Contact {
    Contact { name: self.name, email: self.email }
  }
}
