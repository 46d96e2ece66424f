//! SQL schema for the Pantheon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Weak entities declare `ON DELETE CASCADE` towards their owner, so deleting
/// a quest removes its participations in the same statement.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS deities (
    deity_id        INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    domain          TEXT NOT NULL,
    symbol_of_power TEXT
);

-- CouncilMember subtype of Deity.
CREATE TABLE IF NOT EXISTS council_members (
    deity_id        INTEGER PRIMARY KEY REFERENCES deities(deity_id) ON DELETE CASCADE,
    seat_number     INTEGER NOT NULL UNIQUE,
    palace_location TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS heroes (
    hero_id       INTEGER PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    parent_id     INTEGER REFERENCES deities(deity_id) ON DELETE SET NULL,
    date_of_birth TEXT NOT NULL,   -- YYYY-MM-DD
    fatal_flaw    TEXT NOT NULL,
    arrival_date  TEXT NOT NULL,   -- YYYY-MM-DD
    status        TEXT NOT NULL
        CHECK (status IN ('Active', 'Deceased', 'Missing', 'Retired'))
);

CREATE TABLE IF NOT EXISTS hero_abilities (
    hero_id INTEGER NOT NULL REFERENCES heroes(hero_id) ON DELETE CASCADE,
    ability TEXT    NOT NULL,
    PRIMARY KEY (hero_id, ability)
);

CREATE TABLE IF NOT EXISTS creatures (
    creature_id  INTEGER PRIMARY KEY,
    species      TEXT    NOT NULL,
    threat_level INTEGER NOT NULL
);

-- Titan subtype of Creature; presence of a row marks the creature a Titan.
CREATE TABLE IF NOT EXISTS titans (
    creature_id INTEGER PRIMARY KEY REFERENCES creatures(creature_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS creature_weaknesses (
    creature_id INTEGER NOT NULL REFERENCES creatures(creature_id) ON DELETE CASCADE,
    weakness    TEXT    NOT NULL,
    PRIMARY KEY (creature_id, weakness)
);

CREATE TABLE IF NOT EXISTS creature_habitats (
    creature_id INTEGER NOT NULL REFERENCES creatures(creature_id) ON DELETE CASCADE,
    habitat     TEXT    NOT NULL,
    PRIMARY KEY (creature_id, habitat)
);

-- wielder_id is deliberately not a foreign key: existence is checked by the
-- store when `validate_wielder` is on, and deleting a hero leaves it as is.
CREATE TABLE IF NOT EXISTS artifacts (
    artifact_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    wielder_id  INTEGER
);

CREATE TABLE IF NOT EXISTS artifact_properties (
    artifact_id INTEGER NOT NULL REFERENCES artifacts(artifact_id) ON DELETE CASCADE,
    property    TEXT    NOT NULL,
    PRIMARY KEY (artifact_id, property)
);

CREATE TABLE IF NOT EXISTS prophecies (
    prophecy_id INTEGER PRIMARY KEY,
    full_text   TEXT NOT NULL,
    date_issued TEXT NOT NULL,
    status      TEXT NOT NULL
);

-- One quest per prophecy is enforced by the store, not by a constraint.
CREATE TABLE IF NOT EXISTS quests (
    quest_id    INTEGER PRIMARY KEY,
    objective   TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT,
    outcome     TEXT NOT NULL
        CHECK (outcome IN ('Ongoing', 'Success', 'Failure', 'Abandoned')),
    prophecy_id INTEGER REFERENCES prophecies(prophecy_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS quest_participations (
    hero_id  INTEGER NOT NULL REFERENCES heroes(hero_id) ON DELETE CASCADE,
    quest_id INTEGER NOT NULL REFERENCES quests(quest_id) ON DELETE CASCADE,
    role     TEXT    NOT NULL,
    outcome  TEXT    NOT NULL
        CHECK (outcome IN ('Ongoing', 'Success', 'Failure', 'Deceased', 'Abandoned')),
    PRIMARY KEY (hero_id, quest_id)
);

CREATE TABLE IF NOT EXISTS encounters (
    encounter_id   INTEGER PRIMARY KEY,
    hero_id        INTEGER NOT NULL REFERENCES heroes(hero_id) ON DELETE CASCADE,
    creature_id    INTEGER NOT NULL REFERENCES creatures(creature_id) ON DELETE CASCADE,
    encounter_date TEXT    NOT NULL,
    location       TEXT    NOT NULL,
    outcome        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS combat_encounters (
    combat_id      INTEGER PRIMARY KEY,
    hero_id        INTEGER NOT NULL REFERENCES heroes(hero_id) ON DELETE CASCADE,
    creature_id    INTEGER NOT NULL REFERENCES creatures(creature_id) ON DELETE CASCADE,
    artifact_id    INTEGER REFERENCES artifacts(artifact_id) ON DELETE SET NULL,
    quest_id       INTEGER REFERENCES quests(quest_id) ON DELETE SET NULL,
    encounter_date TEXT    NOT NULL,
    result         TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS sighting_log (
    creature_id INTEGER NOT NULL REFERENCES creatures(creature_id) ON DELETE CASCADE,
    sighted_at  TEXT    NOT NULL,   -- RFC 3339, microsecond precision, UTC
    location    TEXT    NOT NULL,
    reporter_id INTEGER REFERENCES heroes(hero_id) ON DELETE SET NULL,
    PRIMARY KEY (creature_id, sighted_at)
);

CREATE INDEX IF NOT EXISTS heroes_parent_idx        ON heroes(parent_id);
CREATE INDEX IF NOT EXISTS quests_prophecy_idx      ON quests(prophecy_id);
CREATE INDEX IF NOT EXISTS participations_quest_idx ON quest_participations(quest_id);
CREATE INDEX IF NOT EXISTS encounters_creature_idx  ON encounters(creature_id);
CREATE INDEX IF NOT EXISTS combat_quest_idx         ON combat_encounters(quest_id);

PRAGMA user_version = 1;
";
