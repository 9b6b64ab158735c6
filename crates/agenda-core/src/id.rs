//! Opaque string identifiers.
//!
//! Every record kind gets its own newtype so a slot id can never be passed
//! where an appointment id is expected. Ids are assigned by whoever owns the
//! record (the store for appointments, slot management for slots, the
//! directory for parties); the core never interprets their contents.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

      pub fn as_str(&self) -> &str { &self.0 }

      /// `true` when the id is empty or whitespace only.
      pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }

      pub fn into_inner(self) -> String { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self { Self(s) }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self { Self(s.to_owned()) }
    }

    impl AsRef<str> for $name {
      fn as_ref(&self) -> &str { &self.0 }
    }
  };
}

string_id!(
  /// Identifies a bookable [`Slot`](crate::slot::Slot).
  SlotId
);
string_id!(
  /// Identifies an [`Appointment`](crate::appointment::Appointment).
  AppointmentId
);
string_id!(
  /// Identifies a student party.
  StudentId
);
string_id!(
  /// Identifies a psychologist party.
  PsychologistId
);
string_id!(
  /// A party id whose kind is not yet known (see
  /// [`PartyDirectory::resolve_role`](crate::store::PartyDirectory::resolve_role)).
  PartyId
);

impl From<&PartyId> for StudentId {
  fn from(id: &PartyId) -> Self { Self(id.0.clone()) }
}

impl From<&PartyId> for PsychologistId {
  fn from(id: &PartyId) -> Self { Self(id.0.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_ids_are_detected() {
    assert!(SlotId::new("").is_blank());
    assert!(SlotId::new("   ").is_blank());
    assert!(!SlotId::new("slot-9").is_blank());
  }

  #[test]
  fn ids_serialize_as_plain_strings() {
    let json = serde_json::to_string(&AppointmentId::new("appt-1")).unwrap();
    assert_eq!(json, "\"appt-1\"");
    let back: AppointmentId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_str(), "appt-1");
  }
}
