//! SQLite backend for the Agenda booking service.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements every
//! storage trait from `agenda-core`: slots, appointments, the combined
//! booking step, and the party directory.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{NewParty, NewSlot, SqliteStore};
