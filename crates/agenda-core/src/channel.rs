//! The outbound notification capability.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub to:      String,
  pub subject: String,
  /// HTML body.
  pub body:    String,
}

/// Delivers a [`Message`] to its address.
///
/// Implementations make a single attempt; retrying is not the channel's
/// business and the dispatcher does not retry either.
pub trait NotificationChannel: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    message: &'a Message,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
