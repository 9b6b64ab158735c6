use std::{sync::Arc, time::Duration};

use agenda_core::{
  id::{AppointmentId, SlotId, StudentId},
  status::Status,
};

use super::support::{FailingChannel, MemoryStore, RecordingChannel};
use crate::{
  Booking, EventKind, NotificationDispatcher, Notifier, NotifyError, Templates,
};

fn dispatcher<C>(
  store: &Arc<MemoryStore>,
  channel: &Arc<C>,
) -> NotificationDispatcher<MemoryStore, MemoryStore, C>
where
  C: agenda_core::channel::NotificationChannel + 'static,
{
  NotificationDispatcher::new(
    Arc::clone(store),
    Arc::clone(store),
    Arc::clone(channel),
    Templates::default(),
  )
}

#[tokio::test]
async fn booking_and_status_change_reach_the_student() {
  let store = Arc::new(MemoryStore::seeded());
  let channel = Arc::new(RecordingChannel::default());
  let (notifier, worker) = dispatcher(&store, &channel).spawn();
  let booking = Booking::new(Arc::clone(&store), notifier);

  let appt = booking.book(StudentId::new("stu-1"), SlotId::new("slot-1")).await.unwrap();
  booking.change_status(appt.appointment_id, "Confirmed").await.unwrap();

  drop(booking);
  worker.await.unwrap();

  let mut sent = channel.sent();
  sent.sort_by(|a, b| a.subject.cmp(&b.subject));
  assert_eq!(sent.len(), 2);
  assert_eq!(sent[0].subject, "Appointment confirmation - Agenda");
  assert_eq!(sent[0].to, "ana@example.com");
  assert!(sent[0].body.contains("Dr. Silva"));
  assert_eq!(sent[1].subject, "Appointment update: Confirmed");
  assert_eq!(sent[1].to, "ana@example.com");
}

/// What a caller sees from booking slot-1 for stu-1 and then moving it to
/// `Completed`, with the fields the store assigns left out.
#[derive(Debug, PartialEq)]
struct Observed {
  student_id:      String,
  psychologist_id: String,
  slot_id:         String,
  starts_at:       chrono::DateTime<chrono::Utc>,
  ends_at:         chrono::DateTime<chrono::Utc>,
  booked_status:   Status,
  changed_status:  Status,
  stored_status:   Status,
}

async fn book_and_complete<C>(store: Arc<MemoryStore>, channel: Arc<C>) -> Observed
where
  C: agenda_core::channel::NotificationChannel + 'static,
{
  let (notifier, worker) = dispatcher(&store, &channel).spawn();
  let booking = Booking::new(Arc::clone(&store), notifier);

  let appt = booking.book(StudentId::new("stu-1"), SlotId::new("slot-1")).await.unwrap();
  let changed_status = booking
    .change_status(appt.appointment_id.clone(), "Completed")
    .await
    .unwrap();
  let stored = booking.get(appt.appointment_id.clone()).await.unwrap();

  drop(booking);
  worker.await.unwrap();

  Observed {
    student_id: appt.student_id.as_str().to_owned(),
    psychologist_id: appt.psychologist_id.as_str().to_owned(),
    slot_id: appt.slot_id.as_str().to_owned(),
    starts_at: appt.starts_at,
    ends_at: appt.ends_at,
    booked_status: appt.status,
    changed_status,
    stored_status: stored.status,
  }
}

#[tokio::test]
async fn delivery_failure_does_not_affect_booking() {
  let delivered = book_and_complete(
    Arc::new(MemoryStore::seeded()),
    Arc::new(RecordingChannel::default()),
  )
  .await;
  let failed =
    book_and_complete(Arc::new(MemoryStore::seeded()), Arc::new(FailingChannel)).await;

  assert_eq!(failed, delivered);
  assert_eq!(failed.changed_status, Status::Completed);
}

#[tokio::test]
async fn directory_failure_does_not_affect_booking() {
  let delivered = book_and_complete(
    Arc::new(MemoryStore::seeded()),
    Arc::new(RecordingChannel::default()),
  )
  .await;

  let store = Arc::new(MemoryStore::seeded());
  store.set_fail_directory(true);
  let channel = Arc::new(RecordingChannel::default());
  let failed = book_and_complete(Arc::clone(&store), Arc::clone(&channel)).await;

  assert_eq!(failed, delivered);
  assert_eq!(store.appointment_count(), 1);
  assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn booked_notification_needs_both_parties() {
  let store = Arc::new(MemoryStore::seeded());
  store.add_slot("slot-x", "psy-unknown", super::support::at(16, 0));
  let channel = Arc::new(RecordingChannel::default());
  let dispatcher = dispatcher(&store, &channel);
  let booking = Booking::new(Arc::clone(&store), super::support::RecordingNotifier::default());

  let appt = booking.book(StudentId::new("stu-1"), SlotId::new("slot-x")).await.unwrap();
  let err = dispatcher.notify_booked(&appt).await.unwrap_err();
  assert!(matches!(err, NotifyError::UnknownPsychologist(_)), "got {err:?}");

  let appt = booking.book(StudentId::new("stu-ghost"), SlotId::new("slot-1")).await.unwrap();
  let err = dispatcher.notify_booked(&appt).await.unwrap_err();
  assert!(matches!(err, NotifyError::UnknownStudent(_)), "got {err:?}");

  assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn status_notification_for_a_deleted_appointment_is_skipped() {
  let store = Arc::new(MemoryStore::seeded());
  let channel = Arc::new(RecordingChannel::default());
  let dispatcher = dispatcher(&store, &channel);

  let err = dispatcher
    .notify_status_changed(&AppointmentId::new("appt-404"), &Status::Confirmed)
    .await
    .unwrap_err();

  assert!(matches!(err, NotifyError::AppointmentGone(_)));
  assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn status_notification_resolves_the_student_from_the_appointment() {
  let store = Arc::new(MemoryStore::seeded());
  let channel = Arc::new(RecordingChannel::default());
  let dispatcher = dispatcher(&store, &channel);
  let booking = Booking::new(Arc::clone(&store), super::support::RecordingNotifier::default());
  let appt = booking.book(StudentId::new("stu-2"), SlotId::new("slot-2")).await.unwrap();

  let event = dispatcher
    .notify_status_changed(&appt.appointment_id, &"No-show".parse::<Status>().unwrap())
    .await
    .unwrap();

  assert_eq!(event.kind, EventKind::StatusChanged);
  assert_eq!(event.recipient.name, "Bruno");
  assert_eq!(event.message.to, "bruno@example.com");
  assert_eq!(channel.sent(), vec![event.message]);

  store.remove_student("stu-2");
  let err = dispatcher
    .notify_status_changed(&appt.appointment_id, &Status::Confirmed)
    .await
    .unwrap_err();
  assert!(matches!(err, NotifyError::UnknownStudent(_)));
}

#[tokio::test]
async fn booking_calls_return_before_delivery_finishes() {
  let store = Arc::new(MemoryStore::seeded());
  let channel = Arc::new(RecordingChannel::with_delay(Duration::from_millis(300)));
  let (notifier, worker) = dispatcher(&store, &channel).spawn();
  let booking = Booking::new(Arc::clone(&store), notifier);

  let started = tokio::time::Instant::now();
  let appt = booking.book(StudentId::new("stu-1"), SlotId::new("slot-1")).await.unwrap();
  let status = booking.change_status(appt.appointment_id, "Confirmed").await.unwrap();
  assert!(started.elapsed() < Duration::from_millis(100), "took {:?}", started.elapsed());
  assert_eq!(status, Status::Confirmed);
  assert!(channel.sent().is_empty());

  drop(booking);
  worker.await.unwrap();
  assert_eq!(channel.sent().len(), 2);
}

#[tokio::test]
async fn notifications_after_the_worker_stops_are_dropped() {
  let store = Arc::new(MemoryStore::seeded());
  let channel = Arc::new(RecordingChannel::default());
  let (notifier, worker) = dispatcher(&store, &channel).spawn();

  worker.abort();
  let _ = worker.await;

  notifier.status_changed(&AppointmentId::new("appt-0"), &Status::Confirmed);
  assert!(channel.sent().is_empty());
}
