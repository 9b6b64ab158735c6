//! SQL schema for the Agenda SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS parties (
    party_id    TEXT PRIMARY KEY,
    kind        TEXT NOT NULL,   -- 'student' | 'psychologist'
    name        TEXT NOT NULL,
    email       TEXT NOT NULL
);

-- `available` only ever goes 1 -> 0 through a conditional UPDATE, which is
-- what serialises concurrent bookings of the same slot.
CREATE TABLE IF NOT EXISTS slots (
    slot_id         TEXT PRIMARY KEY,
    psychologist_id TEXT NOT NULL,
    starts_at       TEXT NOT NULL,   -- RFC 3339 UTC
    ends_at         TEXT NOT NULL,
    available       INTEGER NOT NULL DEFAULT 1,
    CHECK (available IN (0, 1))
);

-- psychologist_id and the interval are copies of the slot's values taken at
-- booking time. No foreign key on slot_id: slots are managed elsewhere.
CREATE TABLE IF NOT EXISTS appointments (
    appointment_id  TEXT PRIMARY KEY,
    student_id      TEXT NOT NULL,
    psychologist_id TEXT NOT NULL,
    slot_id         TEXT NOT NULL,
    starts_at       TEXT NOT NULL,
    ends_at         TEXT NOT NULL,
    status          TEXT NOT NULL,
    created_at      TEXT NOT NULL,   -- server-assigned
    UNIQUE (slot_id)
);

CREATE INDEX IF NOT EXISTS slots_psychologist_idx        ON slots(psychologist_id);
CREATE INDEX IF NOT EXISTS appointments_psychologist_idx ON appointments(psychologist_id);
CREATE INDEX IF NOT EXISTS appointments_student_idx      ON appointments(student_id);

PRAGMA user_version = 1;
";
