//! Error types for `agenda-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("invalid status label: {0:?}")]
  InvalidStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
