//! Core types and trait definitions for the Agenda booking service.
//!
//! This crate has no HTTP or database dependencies.
//! Every other crate depends on it: storage backends implement its store
//! traits, notification channels implement [`channel::NotificationChannel`],
//! and the booking service is written against those abstractions only.

// Backends implement the store traits with plain `async fn`; the traits
// themselves spell out the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod appointment;
pub mod channel;
pub mod error;
pub mod id;
pub mod party;
pub mod slot;
pub mod status;
pub mod store;

pub use error::{Error, Result};
