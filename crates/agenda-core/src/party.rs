//! Parties: the students and psychologists appointments are made between.
//!
//! Parties are owned by collaborators outside the booking core; the core only
//! reads the display attributes it needs for notifications.

use serde::{Deserialize, Serialize};

use crate::id::PartyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
  Student,
  Psychologist,
}

/// What a notification needs to address someone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub name:  String,
  pub email: String,
}

/// A full directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
  pub party_id: PartyId,
  pub kind:     PartyKind,
  pub name:     String,
  pub email:    String,
}

impl Party {
  pub fn contact(&self) -> Contact {
    Contact { name: self.name.clone(), email: self.email.clone() }
  }
}
