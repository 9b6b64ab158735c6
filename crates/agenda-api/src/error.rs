//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Booking(#[from] agenda_booking::Error),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use agenda_booking::Error;

    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Booking(e) => match e {
        Error::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m),
        Error::NotFound(m) => (StatusCode::NOT_FOUND, m),
        Error::Conflict(m) => (StatusCode::CONFLICT, m),
        Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "request timed out".to_owned()),
        // The booking service has logged the source.
        Error::Internal(_) => {
          (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
        }
      },
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
