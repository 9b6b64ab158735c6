//! In-memory doubles for the store, directory and channel.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
  },
  time::Duration,
};

use agenda_core::{
  appointment::{Appointment, NewAppointment},
  channel::{Message, NotificationChannel},
  id::{AppointmentId, PsychologistId, SlotId, StudentId},
  party::Contact,
  slot::Slot,
  status::Status,
  store::{
    AppointmentStore, BookingStore, Consumption, PartyDirectory, SlotStore, Store,
  },
};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::Notifier;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct Fault(pub &'static str);

#[derive(Default)]
struct State {
  slots:         HashMap<SlotId, Slot>,
  appointments:  HashMap<AppointmentId, Appointment>,
  students:      HashMap<StudentId, Contact>,
  psychologists: HashMap<PsychologistId, Contact>,
}

/// Store and directory in one, with switches for injecting failures.
#[derive(Default)]
pub struct MemoryStore {
  state:          Mutex<State>,
  next_id:        AtomicU64,
  fail_create:    AtomicBool,
  fail_directory: AtomicBool,
  transactional:  AtomicBool,
  delay:          Mutex<Option<Duration>>,
  create_delay:   Mutex<Option<Duration>>,
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
}

impl MemoryStore {
  /// One psychologist (`psy-1`), two students (`stu-1`, `stu-2`) and two
  /// open slots (`slot-1` at 13:30, `slot-2` at 09:00).
  pub fn seeded() -> Self {
    let store = Self::default();
    store.add_psychologist("psy-1", "Dr. Silva", "silva@example.com");
    store.add_student("stu-1", "Ana", "ana@example.com");
    store.add_student("stu-2", "Bruno", "bruno@example.com");
    store.add_slot("slot-1", "psy-1", at(13, 30));
    store.add_slot("slot-2", "psy-1", at(9, 0));
    store
  }

  pub fn add_slot(&self, id: &str, psychologist: &str, starts_at: DateTime<Utc>) {
    let slot = Slot {
      slot_id: SlotId::new(id),
      psychologist_id: PsychologistId::new(psychologist),
      starts_at,
      ends_at: starts_at + chrono::Duration::minutes(50),
      available: true,
    };
    self.state.lock().unwrap().slots.insert(slot.slot_id.clone(), slot);
  }

  pub fn add_student(&self, id: &str, name: &str, email: &str) {
    self
      .state
      .lock()
      .unwrap()
      .students
      .insert(StudentId::new(id), Contact { name: name.into(), email: email.into() });
  }

  pub fn add_psychologist(&self, id: &str, name: &str, email: &str) {
    self
      .state
      .lock()
      .unwrap()
      .psychologists
      .insert(PsychologistId::new(id), Contact { name: name.into(), email: email.into() });
  }

  pub fn remove_student(&self, id: &str) {
    self.state.lock().unwrap().students.remove(&StudentId::new(id));
  }

  pub fn set_fail_create(&self, fail: bool) { self.fail_create.store(fail, Ordering::SeqCst); }

  pub fn set_fail_directory(&self, fail: bool) {
    self.fail_directory.store(fail, Ordering::SeqCst);
  }

  pub fn set_delay(&self, delay: Option<Duration>) { *self.delay.lock().unwrap() = delay; }

  /// Delay applied to `create` only.
  pub fn set_create_delay(&self, delay: Option<Duration>) {
    *self.create_delay.lock().unwrap() = delay;
  }

  /// Report bookings as transactional, so `Booking` makes one `book_slot`
  /// call instead of separate steps.
  pub fn set_transactional(&self, transactional: bool) {
    self.transactional.store(transactional, Ordering::SeqCst);
  }

  pub fn appointment_count(&self) -> usize { self.state.lock().unwrap().appointments.len() }

  pub fn slot_available(&self, id: &str) -> bool {
    self.state.lock().unwrap().slots[&SlotId::new(id)].available
  }

  async fn pause(&self) {
    let delay = *self.delay.lock().unwrap();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
  }
}

impl Store for MemoryStore {
  type Error = Fault;
}

impl SlotStore for MemoryStore {
  async fn get_available(&self, id: SlotId) -> Result<Option<Slot>, Fault> {
    self.pause().await;
    let state = self.state.lock().unwrap();
    Ok(state.slots.get(&id).filter(|s| s.available).cloned())
  }

  async fn consume_if_available(&self, id: SlotId) -> Result<Consumption<Slot>, Fault> {
    self.pause().await;
    let mut state = self.state.lock().unwrap();
    Ok(match state.slots.get_mut(&id) {
      None => Consumption::Missing,
      Some(slot) if !slot.available => Consumption::Taken,
      Some(slot) => {
        slot.available = false;
        Consumption::Consumed(slot.clone())
      }
    })
  }

  async fn release(&self, id: SlotId) -> Result<bool, Fault> {
    let mut state = self.state.lock().unwrap();
    Ok(match state.slots.get_mut(&id) {
      Some(slot) => {
        slot.available = true;
        true
      }
      None => false,
    })
  }
}

impl AppointmentStore for MemoryStore {
  async fn create(&self, input: NewAppointment) -> Result<Appointment, Fault> {
    let delay = *self.create_delay.lock().unwrap();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    if self.fail_create.load(Ordering::SeqCst) {
      return Err(Fault("appointment write failed"));
    }
    let n = self.next_id.fetch_add(1, Ordering::SeqCst);
    let appointment = input.into_appointment(AppointmentId::new(format!("appt-{n}")), Utc::now());
    self
      .state
      .lock()
      .unwrap()
      .appointments
      .insert(appointment.appointment_id.clone(), appointment.clone());
    Ok(appointment)
  }

  async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, Fault> {
    self.pause().await;
    Ok(self.state.lock().unwrap().appointments.get(&id).cloned())
  }

  async fn list_by_psychologist(
    &self,
    id: PsychologistId,
    status: Option<Status>,
  ) -> Result<Vec<Appointment>, Fault> {
    self.pause().await;
    let state = self.state.lock().unwrap();
    let mut found: Vec<_> = state
      .appointments
      .values()
      .filter(|a| a.psychologist_id == id)
      .filter(|a| status.as_ref().is_none_or(|s| &a.status == s))
      .cloned()
      .collect();
    found.sort_by(|a, b| {
      (a.starts_at, &a.appointment_id).cmp(&(b.starts_at, &b.appointment_id))
    });
    Ok(found)
  }

  async fn list_by_student(&self, id: StudentId) -> Result<Vec<Appointment>, Fault> {
    self.pause().await;
    let state = self.state.lock().unwrap();
    let mut found: Vec<_> =
      state.appointments.values().filter(|a| a.student_id == id).cloned().collect();
    found.sort_by(|a, b| {
      (a.starts_at, &a.appointment_id).cmp(&(b.starts_at, &b.appointment_id))
    });
    Ok(found)
  }

  async fn update_status(&self, id: AppointmentId, status: Status) -> Result<bool, Fault> {
    self.pause().await;
    let mut state = self.state.lock().unwrap();
    Ok(match state.appointments.get_mut(&id) {
      Some(appointment) => {
        appointment.status = status;
        true
      }
      None => false,
    })
  }

  async fn delete(&self, id: AppointmentId) -> Result<bool, Fault> {
    self.pause().await;
    Ok(self.state.lock().unwrap().appointments.remove(&id).is_some())
  }
}

impl BookingStore for MemoryStore {
  fn transactional_booking(&self) -> bool { self.transactional.load(Ordering::SeqCst) }
}

impl PartyDirectory for MemoryStore {
  type Error = Fault;

  async fn resolve_student(&self, id: StudentId) -> Result<Option<Contact>, Fault> {
    if self.fail_directory.load(Ordering::SeqCst) {
      return Err(Fault("directory unavailable"));
    }
    Ok(self.state.lock().unwrap().students.get(&id).cloned())
  }

  async fn resolve_psychologist(&self, id: PsychologistId) -> Result<Option<Contact>, Fault> {
    if self.fail_directory.load(Ordering::SeqCst) {
      return Err(Fault("directory unavailable"));
    }
    Ok(self.state.lock().unwrap().psychologists.get(&id).cloned())
  }
}

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingChannel {
  sent:  Mutex<Vec<Message>>,
  delay: Option<Duration>,
}

impl RecordingChannel {
  /// A channel that takes `delay` to deliver each message.
  pub fn with_delay(delay: Duration) -> Self {
    Self { sent: Mutex::default(), delay: Some(delay) }
  }

  pub fn sent(&self) -> Vec<Message> { self.sent.lock().unwrap().clone() }
}

impl NotificationChannel for RecordingChannel {
  type Error = Fault;

  async fn send<'a>(&'a self, message: &'a Message) -> Result<(), Fault> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    self.sent.lock().unwrap().push(message.clone());
    Ok(())
  }
}

/// Rejects every message.
pub struct FailingChannel;

impl NotificationChannel for FailingChannel {
  type Error = Fault;

  async fn send<'a>(&'a self, _message: &'a Message) -> Result<(), Fault> {
    Err(Fault("provider rejected the message"))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notified {
  Booked(AppointmentId),
  StatusChanged(AppointmentId, Status),
}

/// Records notifier calls without doing anything with them.
#[derive(Default)]
pub struct RecordingNotifier {
  calls: Mutex<Vec<Notified>>,
}

impl RecordingNotifier {
  pub fn calls(&self) -> Vec<Notified> { self.calls.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  fn booked(&self, appointment: &Appointment) {
    self
      .calls
      .lock()
      .unwrap()
      .push(Notified::Booked(appointment.appointment_id.clone()));
  }

  fn status_changed(&self, appointment_id: &AppointmentId, status: &Status) {
    self
      .calls
      .lock()
      .unwrap()
      .push(Notified::StatusChanged(appointment_id.clone(), status.clone()));
  }
}
