use std::convert::Infallible;

use agenda_core::channel::{Message, NotificationChannel};

/// Logs each message at `info` and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl NotificationChannel for LogChannel {
  type Error = Infallible;

  async fn send<'a>(&'a self, message: &'a Message) -> Result<(), Infallible> {
    tracing::info!(
      to = %message.to,
      subject = %message.subject,
      "mail delivery disabled; message logged only"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn log_channel_always_succeeds() {
    let message = Message {
      to:      "ana@example.com".into(),
      subject: "Appointment update: Confirmed".into(),
      body:    "<p>hi</p>".into(),
    };
    assert!(LogChannel.send(&message).await.is_ok());
  }
}
