//! JSON REST API for Agenda.
//!
//! Exposes an axum [`Router`] over a [`Booking`] service. Auth, TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = agenda_api::api_router(Arc::new(booking));
//! ```

pub mod appointments;
pub mod error;
pub mod users;

use std::sync::Arc;

use agenda_booking::{Booking, Notifier};
use agenda_core::store::{BookingStore, PartyDirectory};
use axum::{
  Router,
  routing::{get, patch, post},
};

pub use error::ApiError;

/// Build the API router for `booking`.
pub fn api_router<S, N>(booking: Arc<Booking<S, N>>) -> Router<()>
where
  S: BookingStore + PartyDirectory + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Appointments
    .route("/appointments", post(appointments::book::<S, N>))
    .route(
      "/appointments/psychologist",
      get(appointments::list_for_psychologist::<S, N>),
    )
    .route("/appointments/student", get(appointments::list_for_student::<S, N>))
    .route(
      "/appointments/{id}",
      get(appointments::get_one::<S, N>).delete(appointments::cancel::<S, N>),
    )
    .route("/appointments/{id}/status", patch(appointments::change_status::<S, N>))
    // Users
    .route("/users/{id}/role", get(users::role::<S, N>))
    .with_state(booking)
}
