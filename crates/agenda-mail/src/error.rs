use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
  #[error("mail provider request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("mail provider rejected the message ({status}): {body}")]
  Rejected { status: u16, body: String },
}
