//! Appointment booking and best-effort notification.
//!
//! [`Booking`] is the caller-facing service: it turns a slot into an
//! appointment, changes statuses and cancels, bounding every store call with
//! a deadline. After a successful state change it tells a [`Notifier`], which
//! only enqueues work and returns. The [`NotificationDispatcher`] worker picks
//! that work up on its own task, looks the parties up, renders a message and
//! sends it. Whatever happens there is logged and goes nowhere else.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let (notifier, worker) =
//!   NotificationDispatcher::new(store.clone(), store.clone(), channel, Templates::default())
//!     .spawn();
//! let booking = Booking::new(store, notifier);
//! ```

pub mod booking;
pub mod dispatch;
pub mod error;
pub mod notifier;
pub mod templates;

pub use booking::Booking;
pub use dispatch::{
  DispatchHandle, EventKind, NotificationDispatcher, NotificationEvent, NotifyError,
};
pub use error::{Error, Result};
pub use notifier::Notifier;
pub use templates::Templates;

#[cfg(test)]
mod tests;
