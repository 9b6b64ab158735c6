//! Errors surfaced by [`Booking`](crate::Booking) to its callers.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed caller input.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The referenced slot or appointment does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The slot exists but another booking already consumed it.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A store call did not finish within the deadline.
  #[error("store call timed out after {0:?}")]
  Timeout(Duration),

  /// The store failed. The source is for logs, not for clients.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<agenda_core::Error> for Error {
  fn from(e: agenda_core::Error) -> Self { Error::InvalidArgument(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
