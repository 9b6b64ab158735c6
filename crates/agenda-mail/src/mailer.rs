use agenda_core::channel::{Message, NotificationChannel};

use crate::{DeliveryError, LogChannel, ResendChannel};

/// The channel chosen at startup.
#[derive(Clone)]
pub enum Mailer {
  Resend(ResendChannel),
  Log(LogChannel),
}

impl Mailer {
  pub fn name(&self) -> &'static str {
    match self {
      Mailer::Resend(_) => "resend",
      Mailer::Log(_) => "log",
    }
  }
}

impl NotificationChannel for Mailer {
  type Error = DeliveryError;

  async fn send<'a>(&'a self, message: &'a Message) -> Result<(), DeliveryError> {
    match self {
      Mailer::Resend(channel) => channel.send(message).await,
      Mailer::Log(channel) => match channel.send(message).await {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
    }
  }
}
