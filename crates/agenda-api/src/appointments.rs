//! Handlers for `/appointments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/appointments` | Body: `{"student_id":"…","slot_id":"…"}` |
//! | `GET`    | `/appointments/psychologist` | `?psychologist_id=…[&status=…]` |
//! | `GET`    | `/appointments/student` | `?student_id=…` |
//! | `GET`    | `/appointments/{id}` | 404 if not found |
//! | `PATCH`  | `/appointments/{id}/status` | Body: `{"status":"Confirmed"}` |
//! | `DELETE` | `/appointments/{id}` | 204; the slot stays consumed |

use std::sync::Arc;

use agenda_booking::{Booking, Notifier};
use agenda_core::{
  appointment::Appointment,
  id::{AppointmentId, PsychologistId, SlotId, StudentId},
  store::BookingStore,
};
use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

// ─── Book ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BookBody {
  #[serde(default)]
  pub student_id: String,
  #[serde(default)]
  pub slot_id:    String,
}

/// `POST /appointments`
pub async fn book<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  body: Result<Json<BookBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  let Json(body) = body?;
  let appointment = booking
    .book(StudentId::new(body.student_id), SlotId::new(body.slot_id))
    .await?;
  Ok((StatusCode::CREATED, Json(appointment)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PsychologistParams {
  pub psychologist_id: Option<String>,
  pub status:          Option<String>,
}

/// `GET /appointments/psychologist?psychologist_id=<id>[&status=<status>]`
pub async fn list_for_psychologist<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Query(params): Query<PsychologistParams>,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  let id = PsychologistId::new(params.psychologist_id.unwrap_or_default());
  let appointments = booking
    .list_by_psychologist(id, params.status.as_deref())
    .await?;
  Ok(Json(appointments))
}

#[derive(Debug, Deserialize)]
pub struct StudentParams {
  pub student_id: Option<String>,
}

/// `GET /appointments/student?student_id=<id>`
pub async fn list_for_student<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Query(params): Query<StudentParams>,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  let id = StudentId::new(params.student_id.unwrap_or_default());
  Ok(Json(booking.list_by_student(id).await?))
}

// ─── Single appointment ───────────────────────────────────────────────────────

/// `GET /appointments/{id}`
pub async fn get_one<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  Ok(Json(booking.get(AppointmentId::new(id)).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: String,
}

/// `PATCH /appointments/{id}/status`
pub async fn change_status<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Path(id): Path<String>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  let Json(body) = body?;
  let status = booking
    .change_status(AppointmentId::new(id), &body.status)
    .await?;
  Ok(Json(json!({ "message": "status updated", "status": status })))
}

/// `DELETE /appointments/{id}`
pub async fn cancel<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: BookingStore,
  N: Notifier,
{
  booking.cancel(AppointmentId::new(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}
