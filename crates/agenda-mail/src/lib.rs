//! Notification channels that deliver rendered messages as email.
//!
//! - [`ResendChannel`] posts to the Resend HTTP API.
//! - [`LogChannel`] only logs, for running without mail credentials.
//!
//! [`Mailer`] holds whichever of the two was configured.

mod error;
mod logged;
mod mailer;
mod resend;

pub use error::DeliveryError;
pub use logged::LogChannel;
pub use mailer::Mailer;
pub use resend::{DEFAULT_BASE_URL, ResendChannel, ResendConfig};
