//! Error type for `agenda-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] agenda_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown party kind: {0:?}")]
  UnknownPartyKind(String),

  #[error("slot {0} already exists")]
  DuplicateSlot(String),

  #[error("slot must end after it starts")]
  EmptyInterval,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
