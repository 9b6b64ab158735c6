//! Appointment status.
//!
//! `Scheduled` is the initial state set at booking time. Every other
//! recognised status is reachable from every state: the core imposes no
//! ordering on transitions, it only checks that a label is well formed.
//! The set of labels is open; anything that is not one of the four known
//! values is carried verbatim in [`Status::Other`], which can only be
//! built by parsing, so a known label never ends up there.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest accepted custom label, in characters.
pub const MAX_LABEL_LEN: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
  #[default]
  Scheduled,
  Confirmed,
  Completed,
  Cancelled,
  /// A caller-supplied label outside the known set.
  Other(CustomStatus),
}

/// A well-formed label that is not one of the known statuses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomStatus(String);

impl CustomStatus {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CustomStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl Status {
  pub fn as_str(&self) -> &str {
    match self {
      Status::Scheduled => "Scheduled",
      Status::Confirmed => "Confirmed",
      Status::Completed => "Completed",
      Status::Cancelled => "Cancelled",
      Status::Other(label) => label.as_str(),
    }
  }

  /// The status every appointment starts in.
  pub fn is_initial(&self) -> bool { matches!(self, Status::Scheduled) }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let label = s.trim();
    if label.is_empty() {
      return Err(Error::EmptyField("status"));
    }

    // Known values are case-insensitive; the Portuguese labels are what
    // older clients still send.
    let known = match label.to_lowercase().as_str() {
      "scheduled" | "agendada" => Some(Status::Scheduled),
      "confirmed" | "confirmada" => Some(Status::Confirmed),
      "completed" | "concluida" | "concluída" => Some(Status::Completed),
      "cancelled" | "canceled" | "cancelada" => Some(Status::Cancelled),
      _ => None,
    };
    if let Some(status) = known {
      return Ok(status);
    }

    let well_formed = label.chars().count() <= MAX_LABEL_LEN
      && label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'));
    if !well_formed {
      return Err(Error::InvalidStatus(label.to_owned()));
    }

    Ok(Status::Other(CustomStatus(label.to_owned())))
  }
}

impl TryFrom<String> for Status {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Status> for String {
  fn from(status: Status) -> Self {
    match status {
      Status::Other(CustomStatus(label)) => label,
      known => known.as_str().to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_labels_parse_case_insensitively() {
    assert_eq!("confirmed".parse::<Status>().unwrap(), Status::Confirmed);
    assert_eq!("CANCELLED".parse::<Status>().unwrap(), Status::Cancelled);
    assert_eq!(" Scheduled ".parse::<Status>().unwrap(), Status::Scheduled);
  }

  #[test]
  fn legacy_labels_map_to_known_values() {
    assert_eq!("agendada".parse::<Status>().unwrap(), Status::Scheduled);
    assert_eq!("confirmada".parse::<Status>().unwrap(), Status::Confirmed);
    assert_eq!("concluída".parse::<Status>().unwrap(), Status::Completed);
    assert_eq!("cancelada".parse::<Status>().unwrap(), Status::Cancelled);
  }

  #[test]
  fn custom_labels_are_kept_verbatim() {
    let status = "No-show".parse::<Status>().unwrap();
    assert!(matches!(&status, Status::Other(label) if label.as_str() == "No-show"));
    assert_eq!(status.to_string(), "No-show");
  }

  #[test]
  fn known_labels_never_become_custom() {
    for label in [
      "Scheduled", "confirmed", "COMPLETED", "canceled", "agendada", "Confirmada",
      "concluida", "cancelada",
    ] {
      let status = label.parse::<Status>().unwrap();
      assert!(!matches!(status, Status::Other(_)), "{label} parsed as {status:?}");
    }
    let back: Status = serde_json::from_str("\"Confirmed\"").unwrap();
    assert_eq!(back, Status::Confirmed);
  }

  #[test]
  fn empty_label_is_rejected() {
    assert_eq!("".parse::<Status>(), Err(Error::EmptyField("status")));
    assert_eq!("   ".parse::<Status>(), Err(Error::EmptyField("status")));
  }

  #[test]
  fn malformed_labels_are_rejected() {
    assert!(matches!(
      "<script>".parse::<Status>(),
      Err(Error::InvalidStatus(_))
    ));
    let long = "x".repeat(MAX_LABEL_LEN + 1);
    assert!(matches!(long.parse::<Status>(), Err(Error::InvalidStatus(_))));
  }

  #[test]
  fn serde_uses_the_label() {
    let json = serde_json::to_string(&Status::Confirmed).unwrap();
    assert_eq!(json, "\"Confirmed\"");
    let back: Status = serde_json::from_str("\"confirmada\"").unwrap();
    assert_eq!(back, Status::Confirmed);
    assert!(serde_json::from_str::<Status>("\"\"").is_err());
  }
}
