//! Detached notification delivery.
//!
//! [`NotificationDispatcher::spawn`] starts a worker task and returns a
//! [`DispatchHandle`]. The handle implements [`Notifier`] by pushing a job onto
//! an unbounded channel, which never blocks the caller. The worker runs each
//! job on its own task: it resolves the recipients, renders the message and
//! makes one delivery attempt. Failures are logged and dropped.
//!
//! The worker exits once every handle has been dropped and the jobs already
//! accepted have finished, so awaiting its `JoinHandle` after dropping the
//! booking service drains outstanding notifications.

use std::sync::Arc;

use agenda_core::{
  appointment::Appointment,
  channel::{Message, NotificationChannel},
  id::{AppointmentId, PsychologistId, StudentId},
  party::Contact,
  status::Status,
  store::{AppointmentStore, PartyDirectory},
};
use thiserror::Error;
use tokio::{
  sync::mpsc,
  task::{JoinError, JoinHandle, JoinSet},
};
use tracing::{debug, error, info, warn};

use crate::{Notifier, Templates};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a notification was not delivered. Only ever logged.
#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("appointment lookup failed: {0}")]
  Store(#[source] BoxError),

  #[error("directory lookup failed: {0}")]
  Directory(#[source] BoxError),

  #[error("appointment {0} no longer exists")]
  AppointmentGone(AppointmentId),

  #[error("student {0} is not in the directory")]
  UnknownStudent(StudentId),

  #[error("psychologist {0} is not in the directory")]
  UnknownPsychologist(PsychologistId),

  #[error("delivery failed: {0}")]
  Delivery(#[source] BoxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
  Booked,
  StatusChanged,
}

impl EventKind {
  fn as_str(self) -> &'static str {
    match self {
      EventKind::Booked => "booked",
      EventKind::StatusChanged => "status_changed",
    }
  }
}

/// A notification after its recipient has been resolved and its message
/// rendered. Exists only for the duration of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
  pub kind:           EventKind,
  pub appointment_id: AppointmentId,
  pub recipient:      Contact,
  pub message:        Message,
}

#[derive(Debug)]
enum Job {
  Booked(Appointment),
  StatusChanged { appointment_id: AppointmentId, status: Status },
}

/// Enqueues notification jobs for the dispatcher worker.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
  tx: mpsc::UnboundedSender<Job>,
}

impl DispatchHandle {
  fn enqueue(&self, job: Job) {
    if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
      warn!(?job, "notification worker has stopped; notification dropped");
    }
  }
}

impl Notifier for DispatchHandle {
  fn booked(&self, appointment: &Appointment) {
    self.enqueue(Job::Booked(appointment.clone()));
  }

  fn status_changed(&self, appointment_id: &AppointmentId, status: &Status) {
    self.enqueue(Job::StatusChanged {
      appointment_id: appointment_id.clone(),
      status:         status.clone(),
    });
  }
}

/// Resolves, renders and sends notifications.
pub struct NotificationDispatcher<S, D, C> {
  appointments: Arc<S>,
  directory:    Arc<D>,
  channel:      Arc<C>,
  templates:    Templates,
}

impl<S, D, C> NotificationDispatcher<S, D, C>
where
  S: AppointmentStore + 'static,
  D: PartyDirectory + 'static,
  C: NotificationChannel + 'static,
{
  pub fn new(
    appointments: Arc<S>,
    directory: Arc<D>,
    channel: Arc<C>,
    templates: Templates,
  ) -> Self {
    Self { appointments, directory, channel, templates }
  }

  /// Start the worker on the current runtime.
  pub fn spawn(self) -> (DispatchHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(Arc::new(self).run(rx));
    (DispatchHandle { tx }, worker)
  }

  /// Send the booking confirmation for `appointment` to its student.
  pub async fn notify_booked(
    &self,
    appointment: &Appointment,
  ) -> Result<NotificationEvent, NotifyError> {
    let (student, psychologist) = tokio::join!(
      self.directory.resolve_student(appointment.student_id.clone()),
      self
        .directory
        .resolve_psychologist(appointment.psychologist_id.clone()),
    );
    let student = student
      .map_err(|e| NotifyError::Directory(Box::new(e)))?
      .ok_or_else(|| NotifyError::UnknownStudent(appointment.student_id.clone()))?;
    let psychologist = psychologist
      .map_err(|e| NotifyError::Directory(Box::new(e)))?
      .ok_or_else(|| {
        NotifyError::UnknownPsychologist(appointment.psychologist_id.clone())
      })?;

    let message =
      self
        .templates
        .booking_confirmation(&student, &psychologist, appointment);
    self
      .deliver(NotificationEvent {
        kind: EventKind::Booked,
        appointment_id: appointment.appointment_id.clone(),
        recipient: student,
        message,
      })
      .await
  }

  /// Tell the student of `appointment_id` that its status is now `status`.
  ///
  /// The appointment is read again to find the student; if it was deleted
  /// in the meantime nothing is sent.
  pub async fn notify_status_changed(
    &self,
    appointment_id: &AppointmentId,
    status: &Status,
  ) -> Result<NotificationEvent, NotifyError> {
    let appointment = self
      .appointments
      .get(appointment_id.clone())
      .await
      .map_err(|e| NotifyError::Store(Box::new(e)))?
      .ok_or_else(|| NotifyError::AppointmentGone(appointment_id.clone()))?;

    let student = self
      .directory
      .resolve_student(appointment.student_id.clone())
      .await
      .map_err(|e| NotifyError::Directory(Box::new(e)))?
      .ok_or_else(|| NotifyError::UnknownStudent(appointment.student_id.clone()))?;

    let message = self.templates.status_change(&student, status);
    self
      .deliver(NotificationEvent {
        kind: EventKind::StatusChanged,
        appointment_id: appointment_id.clone(),
        recipient: student,
        message,
      })
      .await
  }

  async fn deliver(
    &self,
    event: NotificationEvent,
  ) -> Result<NotificationEvent, NotifyError> {
    self
      .channel
      .send(&event.message)
      .await
      .map_err(|e| NotifyError::Delivery(Box::new(e)))?;
    Ok(event)
  }

  async fn run(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<Job>) {
    let mut in_flight = JoinSet::new();

    loop {
      tokio::select! {
        job = rx.recv() => match job {
          Some(job) => {
            let this = Arc::clone(&self);
            in_flight.spawn(async move { this.process(job).await });
          }
          None => break,
        },
        Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
          log_join(done);
        }
      }
    }

    while let Some(done) = in_flight.join_next().await {
      log_join(done);
    }
    debug!("notification worker stopped");
  }

  async fn process(&self, job: Job) {
    let (kind, appointment_id, outcome) = match job {
      Job::Booked(appointment) => (
        EventKind::Booked,
        appointment.appointment_id.clone(),
        self.notify_booked(&appointment).await,
      ),
      Job::StatusChanged { appointment_id, status } => {
        let outcome = self.notify_status_changed(&appointment_id, &status).await;
        (EventKind::StatusChanged, appointment_id, outcome)
      }
    };

    match outcome {
      Ok(event) => info!(
        kind = kind.as_str(),
        appointment_id = %appointment_id,
        to = %event.recipient.email,
        "notification sent"
      ),
      Err(e) => warn!(
        kind = kind.as_str(),
        appointment_id = %appointment_id,
        error = %e,
        "notification not sent"
      ),
    }
  }
}

fn log_join(result: Result<(), JoinError>) {
  if let Err(e) = result {
    error!(error = %e, "notification task panicked");
  }
}
