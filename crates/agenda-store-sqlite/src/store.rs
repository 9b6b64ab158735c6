//! [`SqliteStore`]: the SQLite implementation of the `agenda-core` store
//! traits.

use std::path::Path;

use agenda_core::{
  appointment::{Appointment, NewAppointment},
  id::{AppointmentId, PartyId, PsychologistId, SlotId, StudentId},
  party::{Contact, Party, PartyKind},
  slot::Slot,
  status::Status,
  store::{
    AppointmentStore, BookingStore, Consumption, PartyDirectory, SlotStore, Store,
  },
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  encode::{
    APPOINTMENT_COLUMNS, RawAppointment, RawContact, RawSlot, SLOT_COLUMNS,
    encode_dt, encode_party_kind,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Admin inputs ────────────────────────────────────────────────────────────

/// A slot to declare. Slot ids are chosen by whoever manages the schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSlot {
  pub slot_id:         SlotId,
  pub psychologist_id: PsychologistId,
  pub starts_at:       DateTime<Utc>,
  pub ends_at:         DateTime<Utc>,
}

/// A directory entry to insert or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct NewParty {
  pub party_id: PartyId,
  pub name:     String,
  pub email:    String,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Agenda store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are executed one at a time on the connection's thread, and every
/// multi-statement write runs in a transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store ready");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Slot management ───────────────────────────────────────────────────────

  /// Declare a new, available slot.
  pub async fn add_slot(&self, input: NewSlot) -> Result<Slot> {
    if input.ends_at <= input.starts_at {
      return Err(Error::EmptyInterval);
    }

    let slot = Slot {
      slot_id:         input.slot_id,
      psychologist_id: input.psychologist_id,
      starts_at:       input.starts_at,
      ends_at:         input.ends_at,
      available:       true,
    };

    let id_str     = slot.slot_id.as_str().to_owned();
    let psy_str    = slot.psychologist_id.as_str().to_owned();
    let starts_str = encode_dt(slot.starts_at);
    let ends_str   = encode_dt(slot.ends_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO slots (slot_id, psychologist_id, starts_at, ends_at, available)
           VALUES (?1, ?2, ?3, ?4, 1)",
          rusqlite::params![id_str, psy_str, starts_str, ends_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateSlot(slot.slot_id.into_inner()));
    }
    tracing::debug!(slot_id = %slot.slot_id, "slot declared");
    Ok(slot)
  }

  // ── Directory management ──────────────────────────────────────────────────

  /// Insert a party, or refresh the name and email of an existing one.
  pub async fn upsert_party(&self, kind: PartyKind, input: NewParty) -> Result<Party> {
    let party = Party {
      party_id: input.party_id,
      kind,
      name:     input.name,
      email:    input.email,
    };

    let id_str    = party.party_id.as_str().to_owned();
    let kind_str  = encode_party_kind(kind).to_owned();
    let name      = party.name.clone();
    let email     = party.email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO parties (party_id, kind, name, email) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (party_id) DO UPDATE
             SET kind = excluded.kind, name = excluded.name, email = excluded.email",
          rusqlite::params![id_str, kind_str, name, email],
        )?;
        Ok(())
      })
      .await?;

    Ok(party)
  }

  async fn resolve_party(&self, kind: PartyKind, id: String) -> Result<Option<Contact>> {
    let kind_str = encode_party_kind(kind).to_owned();

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT name, email FROM parties WHERE party_id = ?1 AND kind = ?2",
            rusqlite::params![id, kind_str],
            |row| Ok(RawContact { name: row.get(0)?, email: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawContact::into_contact))
  }

  async fn query_appointments(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Appointment>> {
    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawAppointment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppointment::into_appointment).collect()
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

/// The conditional write that makes double-booking impossible. Must run
/// inside a transaction so the follow-up reads see the same state.
fn consume_in(
  tx: &rusqlite::Transaction<'_>,
  slot_id: &str,
) -> rusqlite::Result<Consumption<RawSlot>> {
  let changed = tx.execute(
    "UPDATE slots SET available = 0 WHERE slot_id = ?1 AND available = 1",
    rusqlite::params![slot_id],
  )?;

  if changed == 1 {
    let raw = tx.query_row(
      &format!("SELECT {SLOT_COLUMNS} FROM slots WHERE slot_id = ?1"),
      rusqlite::params![slot_id],
      RawSlot::from_row,
    )?;
    return Ok(Consumption::Consumed(raw));
  }

  let exists = tx
    .query_row(
      "SELECT 1 FROM slots WHERE slot_id = ?1",
      rusqlite::params![slot_id],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);

  Ok(if exists { Consumption::Taken } else { Consumption::Missing })
}

fn decode_consumption<R, T>(
  raw: Consumption<R>,
  decode: impl FnOnce(R) -> Result<T>,
) -> Result<Consumption<T>> {
  match raw {
    Consumption::Consumed(r) => Ok(Consumption::Consumed(decode(r)?)),
    Consumption::Taken => Ok(Consumption::Taken),
    Consumption::Missing => Ok(Consumption::Missing),
  }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

impl SlotStore for SqliteStore {
  async fn get_available(&self, id: SlotId) -> Result<Option<Slot>> {
    let id_str = id.into_inner();

    let raw: Option<RawSlot> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SLOT_COLUMNS} FROM slots WHERE slot_id = ?1 AND available = 1"),
            rusqlite::params![id_str],
            RawSlot::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSlot::into_slot).transpose()
  }

  async fn consume_if_available(&self, id: SlotId) -> Result<Consumption<Slot>> {
    let id_str = id.into_inner();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = consume_in(&tx, &id_str)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    decode_consumption(raw, RawSlot::into_slot)
  }

  async fn release(&self, id: SlotId) -> Result<bool> {
    let id_str = id.into_inner();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE slots SET available = 1 WHERE slot_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}

impl AppointmentStore for SqliteStore {
  async fn create(&self, input: NewAppointment) -> Result<Appointment> {
    let appointment =
      input.into_appointment(AppointmentId::new(Uuid::new_v4().to_string()), Utc::now());

    let id_str      = appointment.appointment_id.as_str().to_owned();
    let student_str = appointment.student_id.as_str().to_owned();
    let psy_str     = appointment.psychologist_id.as_str().to_owned();
    let slot_str    = appointment.slot_id.as_str().to_owned();
    let starts_str  = encode_dt(appointment.starts_at);
    let ends_str    = encode_dt(appointment.ends_at);
    let status_str  = appointment.status.as_str().to_owned();
    let created_str = encode_dt(appointment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          rusqlite::params![
            id_str,
            student_str,
            psy_str,
            slot_str,
            starts_str,
            ends_str,
            status_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(appointment)
  }

  async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>> {
    let id_str = id.into_inner();

    let raw: Option<RawAppointment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = ?1"
            ),
            rusqlite::params![id_str],
            RawAppointment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAppointment::into_appointment).transpose()
  }

  async fn list_by_psychologist(
    &self,
    id:     PsychologistId,
    status: Option<Status>,
  ) -> Result<Vec<Appointment>> {
    let (sql, params) = match status {
      Some(status) => (
        format!(
          "SELECT {APPOINTMENT_COLUMNS} FROM appointments
           WHERE psychologist_id = ?1 AND status = ?2
           ORDER BY starts_at, appointment_id"
        ),
        vec![id.into_inner(), String::from(status)],
      ),
      None => (
        format!(
          "SELECT {APPOINTMENT_COLUMNS} FROM appointments
           WHERE psychologist_id = ?1
           ORDER BY starts_at, appointment_id"
        ),
        vec![id.into_inner()],
      ),
    };

    self.query_appointments(sql, params).await
  }

  async fn list_by_student(&self, id: StudentId) -> Result<Vec<Appointment>> {
    let sql = format!(
      "SELECT {APPOINTMENT_COLUMNS} FROM appointments
       WHERE student_id = ?1
       ORDER BY starts_at, appointment_id"
    );
    self.query_appointments(sql, vec![id.into_inner()]).await
  }

  async fn update_status(&self, id: AppointmentId, status: Status) -> Result<bool> {
    let id_str     = id.into_inner();
    let status_str = String::from(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE appointments SET status = ?2 WHERE appointment_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete(&self, id: AppointmentId) -> Result<bool> {
    let id_str = id.into_inner();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM appointments WHERE appointment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}

impl BookingStore for SqliteStore {
  fn transactional_booking(&self) -> bool { true }

  /// Consume the slot and insert the appointment in one transaction. The
  /// appointment's psychologist and interval are copied from the slot row by
  /// the INSERT itself.
  async fn book_slot(
    &self,
    slot_id:    SlotId,
    student_id: StudentId,
  ) -> Result<Consumption<Appointment>> {
    let slot_str    = slot_id.into_inner();
    let student_str = student_id.into_inner();
    let appt_str    = Uuid::new_v4().to_string();
    let status_str  = Status::Scheduled.as_str().to_owned();
    let created_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // On the early returns nothing was written; dropping `tx` rolls back.
        match consume_in(&tx, &slot_str)? {
          Consumption::Consumed(_) => {}
          Consumption::Taken => return Ok(Consumption::Taken),
          Consumption::Missing => return Ok(Consumption::Missing),
        }

        tx.execute(
          "INSERT INTO appointments (
             appointment_id, student_id, psychologist_id, slot_id,
             starts_at, ends_at, status, created_at
           )
           SELECT ?1, ?2, psychologist_id, slot_id, starts_at, ends_at, ?3, ?4
           FROM slots WHERE slot_id = ?5",
          rusqlite::params![appt_str, student_str, status_str, created_str, slot_str],
        )?;
        let raw = tx.query_row(
          &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = ?1"
          ),
          rusqlite::params![appt_str],
          RawAppointment::from_row,
        )?;
        tx.commit()?;
        Ok(Consumption::Consumed(raw))
      })
      .await?;

    decode_consumption(raw, RawAppointment::into_appointment)
  }
}

impl PartyDirectory for SqliteStore {
  type Error = Error;

  async fn resolve_student(&self, id: StudentId) -> Result<Option<Contact>> {
    self.resolve_party(PartyKind::Student, id.into_inner()).await
  }

  async fn resolve_psychologist(&self, id: PsychologistId) -> Result<Option<Contact>> {
    self.resolve_party(PartyKind::Psychologist, id.into_inner()).await
  }
}
