//! Start-up seeding of parties and slots.
//!
//! ```toml
//! [[psychologists]]
//! party_id = "psy-1"
//! name = "Dr. Silva"
//! email = "silva@example.com"
//!
//! [[students]]
//! party_id = "stu-1"
//! name = "Ana"
//! email = "ana@example.com"
//!
//! [[slots]]
//! slot_id = "slot-1"
//! psychologist_id = "psy-1"
//! starts_at = "2025-01-10T09:00:00Z"
//! ends_at = "2025-01-10T09:50:00Z"
//! ```

use std::path::Path;

use agenda_core::party::PartyKind;
use agenda_store_sqlite::{Error as StoreError, NewParty, NewSlot, SqliteStore};
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
  pub students:      Vec<NewParty>,
  pub psychologists: Vec<NewParty>,
  pub slots:         Vec<NewSlot>,
}

/// What [`apply`] wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Seeded {
  pub parties:       usize,
  pub slots:         usize,
  /// Slots that already existed and were left untouched.
  pub skipped_slots: usize,
}

/// Read a seed file.
pub fn load(path: &Path) -> anyhow::Result<Seed> {
  config::Config::builder()
    .add_source(config::File::from(path).format(config::FileFormat::Toml))
    .build()
    .with_context(|| format!("failed to read seed file {path:?}"))?
    .try_deserialize()
    .with_context(|| format!("invalid seed file {path:?}"))
}

/// Write `seed` into `store`. Parties are upserted; slots that already exist
/// are skipped so the same seed can be applied on every start.
pub async fn apply(store: &SqliteStore, seed: Seed) -> anyhow::Result<Seeded> {
  let mut seeded = Seeded::default();

  let parties = seed
    .students
    .into_iter()
    .map(|p| (PartyKind::Student, p))
    .chain(seed.psychologists.into_iter().map(|p| (PartyKind::Psychologist, p)));
  for (kind, party) in parties {
    let id = party.party_id.clone();
    store
      .upsert_party(kind, party)
      .await
      .with_context(|| format!("failed to seed party {id}"))?;
    seeded.parties += 1;
  }

  for slot in seed.slots {
    let id = slot.slot_id.clone();
    match store.add_slot(slot).await {
      Ok(_) => seeded.slots += 1,
      Err(StoreError::DuplicateSlot(_)) => {
        tracing::debug!(slot_id = %id, "seed slot already present");
        seeded.skipped_slots += 1;
      }
      Err(e) => return Err(e).with_context(|| format!("failed to seed slot {id}")),
    }
  }

  tracing::info!(
    parties = seeded.parties,
    slots = seeded.slots,
    skipped_slots = seeded.skipped_slots,
    "seed applied"
  );
  Ok(seeded)
}
