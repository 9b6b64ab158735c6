//! The boundary between booking and notification.

use agenda_core::{appointment::Appointment, id::AppointmentId, status::Status};

/// Receives booking events.
///
/// Methods return nothing and must not block or await: an implementation
/// hands the event off (see [`DispatchHandle`](crate::DispatchHandle)) and
/// returns immediately, so nothing it does can change the outcome or the
/// latency of the operation that triggered it.
pub trait Notifier: Send + Sync {
  fn booked(&self, appointment: &Appointment);

  fn status_changed(&self, appointment_id: &AppointmentId, status: &Status);
}
