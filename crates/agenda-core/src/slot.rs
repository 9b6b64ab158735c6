//! Slot: a declared bookable interval belonging to one psychologist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PsychologistId, SlotId};

/// A bookable time interval.
///
/// Once `available` flips to `false` the slot backs exactly one appointment
/// and is never offered again; nothing in the core flips it back except the
/// compensation path of a failed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
  pub slot_id:         SlotId,
  pub psychologist_id: PsychologistId,
  pub starts_at:       DateTime<Utc>,
  pub ends_at:         DateTime<Utc>,
  pub available:       bool,
}
