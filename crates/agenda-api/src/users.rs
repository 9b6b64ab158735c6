//! `GET /users/{id}/role`: `{"role":"psychologist"|"student"|null}`.

use std::sync::Arc;

use agenda_booking::{Booking, Notifier};
use agenda_core::{
  id::PartyId,
  store::{BookingStore, PartyDirectory},
};
use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::{Value, json};

use crate::error::ApiError;

pub async fn role<S, N>(
  State(booking): State<Arc<Booking<S, N>>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: BookingStore + PartyDirectory,
  N: Notifier,
{
  let role = booking.resolve_role(PartyId::new(id)).await?;
  Ok(Json(json!({ "role": role })))
}
