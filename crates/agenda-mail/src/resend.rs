//! Delivery through the Resend HTTP API (`POST /emails`).

use std::time::Duration;

use agenda_core::channel::{Message, NotificationChannel};
use reqwest::Client;
use serde::Serialize;

use crate::DeliveryError;

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendConfig {
  pub api_key:  String,
  /// `From` header, e.g. `Agenda <onboarding@resend.dev>`.
  pub sender:   String,
  pub base_url: String,
  /// Upper bound on one delivery attempt.
  pub timeout:  Duration,
}

impl ResendConfig {
  pub fn new(api_key: impl Into<String>, sender: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      sender:   sender.into(),
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(10),
    }
  }
}

#[derive(Serialize)]
struct SendEmail<'a> {
  from:    &'a str,
  to:      [&'a str; 1],
  subject: &'a str,
  html:    &'a str,
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ResendChannel {
  client: Client,
  config: ResendConfig,
}

impl ResendChannel {
  pub fn new(config: ResendConfig) -> Result<Self, DeliveryError> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/emails", self.config.base_url.trim_end_matches('/'))
  }
}

impl NotificationChannel for ResendChannel {
  type Error = DeliveryError;

  async fn send<'a>(&'a self, message: &'a Message) -> Result<(), DeliveryError> {
    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&SendEmail {
        from:    &self.config.sender,
        to:      [&message.to],
        subject: &message.subject,
        html:    &message.body,
      })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(DeliveryError::Rejected { status: status.as_u16(), body });
    }

    tracing::debug!(to = %message.to, "message accepted by mail provider");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
  };

  use super::*;

  fn message() -> Message {
    Message {
      to:      "ana@example.com".into(),
      subject: "Appointment confirmation - Agenda".into(),
      body:    "<p>Hello Ana</p>".into(),
    }
  }

  fn channel(server: &MockServer) -> ResendChannel {
    let mut config = ResendConfig::new("re_test", "Agenda <onboarding@resend.dev>");
    config.base_url = server.uri();
    ResendChannel::new(config).unwrap()
  }

  #[tokio::test]
  async fn posts_the_message_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/emails"))
      .and(header("authorization", "Bearer re_test"))
      .and(body_json(json!({
        "from": "Agenda <onboarding@resend.dev>",
        "to": ["ana@example.com"],
        "subject": "Appointment confirmation - Agenda",
        "html": "<p>Hello Ana</p>",
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email-1" })))
      .expect(1)
      .mount(&server)
      .await;

    channel(&server).send(&message()).await.unwrap();
  }

  #[tokio::test]
  async fn provider_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/emails"))
      .respond_with(
        ResponseTemplate::new(422).set_body_string("invalid `to` field"),
      )
      .expect(1)
      .mount(&server)
      .await;

    let err = channel(&server).send(&message()).await.unwrap_err();

    match err {
      DeliveryError::Rejected { status, body } => {
        assert_eq!(status, 422);
        assert!(body.contains("invalid"));
      }
      other => panic!("expected rejection, got {other:?}"),
    }
  }
}
