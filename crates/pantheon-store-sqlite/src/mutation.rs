//! Transactional write functions over an explicit SQLite transaction.
//!
//! Each function issues every statement of one mutation through the
//! transaction it is handed and returns an error as soon as a precondition
//! fails; it never commits or rolls back itself. Committing on success and
//! rolling back on error is the caller's job (see
//! [`SqliteStore`](crate::SqliteStore)), which makes every function here
//! all-or-nothing.
//!
//! Precondition reads run inside the same transaction as the writes that
//! depend on them. The store opens that transaction with `BEGIN IMMEDIATE`,
//! so no other writer can slip in between the check and the write.

use chrono::{DateTime, NaiveDate, Timelike as _, Utc};
use rusqlite::{OptionalExtension as _, Transaction, params};

use pantheon_core::{
  Error as CoreError,
  model::{
    ArtifactId, CreatureId, DeityId, EncounterId, HeroId, HeroStatus,
    NewArtifact, NewCombat, NewCreature, NewDeity, NewEncounter, NewHero,
    NewProphecy, NewQuest, ParticipationOutcome, ProphecyId, QuestDeletion,
    QuestId, QuestOutcome, StatusChange,
  },
};

use crate::{
  Result,
  encode::{encode_date, encode_enum, encode_timestamp, now_timestamp},
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Run a single-parameter `SELECT 1 ...` and report whether it found a row.
fn exists(tx: &Transaction<'_>, sql: &str, id: i64) -> Result<bool> {
  Ok(tx.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn hero_exists(tx: &Transaction<'_>, hero_id: HeroId) -> Result<bool> {
  exists(tx, "SELECT 1 FROM heroes WHERE hero_id = ?1", hero_id)
}

/// Insert one `(owner, value)` row per non-blank, trimmed entry of `values`.
///
/// Entries are not de-duplicated here; the owning table's primary key
/// decides whether a repeat is acceptable.
fn insert_values(tx: &Transaction<'_>, sql: &str, owner: i64, values: &[String]) -> Result<()> {
  let mut stmt = tx.prepare(sql)?;
  for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
    stmt.execute(params![owner, value])?;
  }
  Ok(())
}

// ─── Heroes ──────────────────────────────────────────────────────────────────

pub fn create_hero(tx: &Transaction<'_>, input: &NewHero) -> Result<HeroId> {
  if let Some(parent_id) = input.parent_id
    && !exists(tx, "SELECT 1 FROM deities WHERE deity_id = ?1", parent_id)?
  {
    return Err(CoreError::ParentNotFound(parent_id).into());
  }

  tx.execute(
    "INSERT INTO heroes (
       first_name, last_name, parent_id, date_of_birth,
       fatal_flaw, arrival_date, status
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      input.first_name,
      input.last_name,
      input.parent_id,
      encode_date(input.date_of_birth),
      input.fatal_flaw,
      encode_date(input.arrival_date),
      encode_enum(input.status),
    ],
  )?;
  let hero_id = tx.last_insert_rowid();

  insert_values(
    tx,
    "INSERT INTO hero_abilities (hero_id, ability) VALUES (?1, ?2)",
    hero_id,
    &input.abilities,
  )?;

  Ok(hero_id)
}

/// Set a hero's status; entering `Deceased` also moves every ongoing
/// participation of the hero to `Deceased`.
///
/// Absence of the hero is detected from the status update itself (zero rows
/// affected), not from a separate lookup.
pub fn set_hero_status(
  tx: &Transaction<'_>,
  hero_id: HeroId,
  status: HeroStatus,
) -> Result<StatusChange> {
  let updated = tx.execute(
    "UPDATE heroes SET status = ?1 WHERE hero_id = ?2",
    params![encode_enum(status), hero_id],
  )?;
  if updated == 0 {
    return Err(CoreError::HeroNotFound(hero_id).into());
  }

  let participations_closed = if status == HeroStatus::Deceased {
    tx.execute(
      "UPDATE quest_participations SET outcome = ?1
       WHERE hero_id = ?2 AND outcome = ?3",
      params![
        encode_enum(ParticipationOutcome::Deceased),
        hero_id,
        encode_enum(ParticipationOutcome::Ongoing),
      ],
    )?
  } else {
    0
  };

  Ok(StatusChange { hero_id, status, participations_closed })
}

pub fn remove_hero_ability(tx: &Transaction<'_>, hero_id: HeroId, ability: &str) -> Result<()> {
  let deleted = tx.execute(
    "DELETE FROM hero_abilities WHERE hero_id = ?1 AND ability = ?2",
    params![hero_id, ability],
  )?;
  if deleted == 0 {
    return Err(
      CoreError::AbilityNotFound { hero_id, ability: ability.to_owned() }.into(),
    );
  }
  Ok(())
}

// ─── Quests ──────────────────────────────────────────────────────────────────

/// Create a quest, refusing a prophecy that another quest already follows.
pub fn create_quest(tx: &Transaction<'_>, input: &NewQuest) -> Result<QuestId> {
  if let Some(prophecy_id) = input.prophecy_id {
    let linked: Option<QuestId> = tx
      .query_row(
        "SELECT quest_id FROM quests WHERE prophecy_id = ?1 LIMIT 1",
        [prophecy_id],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(quest_id) = linked {
      return Err(CoreError::ProphecyAlreadyLinked { prophecy_id, quest_id }.into());
    }
  }

  tx.execute(
    "INSERT INTO quests (objective, start_date, outcome, prophecy_id)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      input.objective,
      encode_date(input.start_date),
      encode_enum(input.outcome),
      input.prophecy_id,
    ],
  )?;
  Ok(tx.last_insert_rowid())
}

/// Set a quest's outcome. A `None` end date leaves the stored one untouched.
pub fn set_quest_outcome(
  tx: &Transaction<'_>,
  quest_id: QuestId,
  outcome: QuestOutcome,
  end_date: Option<NaiveDate>,
) -> Result<()> {
  let updated = tx.execute(
    "UPDATE quests SET outcome = ?1, end_date = COALESCE(?2, end_date)
     WHERE quest_id = ?3",
    params![encode_enum(outcome), end_date.map(encode_date), quest_id],
  )?;
  if updated == 0 {
    return Err(CoreError::QuestNotFound(quest_id).into());
  }
  Ok(())
}

/// Delete a quest. Its participations go with it through the schema's
/// `ON DELETE CASCADE`; the count taken beforehand is what gets reported.
pub fn delete_quest(tx: &Transaction<'_>, quest_id: QuestId) -> Result<QuestDeletion> {
  let participations: i64 = tx.query_row(
    "SELECT COUNT(*) FROM quest_participations WHERE quest_id = ?1",
    [quest_id],
    |row| row.get(0),
  )?;

  let deleted = tx.execute("DELETE FROM quests WHERE quest_id = ?1", [quest_id])?;
  if deleted == 0 {
    return Err(CoreError::QuestNotFound(quest_id).into());
  }

  Ok(QuestDeletion {
    quest_id,
    participations_removed: participations as usize,
  })
}

pub fn enlist_hero(
  tx: &Transaction<'_>,
  hero_id: HeroId,
  quest_id: QuestId,
  role: &str,
) -> Result<()> {
  if !hero_exists(tx, hero_id)? {
    return Err(CoreError::HeroNotFound(hero_id).into());
  }
  if !exists(tx, "SELECT 1 FROM quests WHERE quest_id = ?1", quest_id)? {
    return Err(CoreError::QuestNotFound(quest_id).into());
  }
  let enlisted = tx
    .query_row(
      "SELECT 1 FROM quest_participations WHERE hero_id = ?1 AND quest_id = ?2",
      [hero_id, quest_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if enlisted {
    return Err(CoreError::AlreadyEnlisted { hero_id, quest_id }.into());
  }

  tx.execute(
    "INSERT INTO quest_participations (hero_id, quest_id, role, outcome)
     VALUES (?1, ?2, ?3, ?4)",
    params![hero_id, quest_id, role, encode_enum(ParticipationOutcome::Ongoing)],
  )?;
  Ok(())
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

fn check_wielder(tx: &Transaction<'_>, wielder_id: Option<HeroId>, validate: bool) -> Result<()> {
  if validate
    && let Some(wielder_id) = wielder_id
    && !hero_exists(tx, wielder_id)?
  {
    return Err(CoreError::WielderNotFound(wielder_id).into());
  }
  Ok(())
}

pub fn create_artifact(
  tx: &Transaction<'_>,
  input: &NewArtifact,
  validate_wielder: bool,
) -> Result<ArtifactId> {
  check_wielder(tx, input.wielder_id, validate_wielder)?;

  tx.execute(
    "INSERT INTO artifacts (name, description, wielder_id) VALUES (?1, ?2, ?3)",
    params![input.name, input.description, input.wielder_id],
  )?;
  let artifact_id = tx.last_insert_rowid();

  insert_values(
    tx,
    "INSERT INTO artifact_properties (artifact_id, property) VALUES (?1, ?2)",
    artifact_id,
    &input.properties,
  )?;
  Ok(artifact_id)
}

/// Hand an artifact to `wielder_id`, or un-wield it with `None`.
///
/// With `validate_wielder` off, any identifier is stored as given.
pub fn set_artifact_wielder(
  tx: &Transaction<'_>,
  artifact_id: ArtifactId,
  wielder_id: Option<HeroId>,
  validate_wielder: bool,
) -> Result<()> {
  check_wielder(tx, wielder_id, validate_wielder)?;

  let updated = tx.execute(
    "UPDATE artifacts SET wielder_id = ?1 WHERE artifact_id = ?2",
    params![wielder_id, artifact_id],
  )?;
  if updated == 0 {
    return Err(CoreError::ArtifactNotFound(artifact_id).into());
  }
  Ok(())
}

// ─── Creatures & sightings ───────────────────────────────────────────────────

pub fn create_creature(tx: &Transaction<'_>, input: &NewCreature) -> Result<CreatureId> {
  tx.execute(
    "INSERT INTO creatures (species, threat_level) VALUES (?1, ?2)",
    params![input.species, input.threat_level],
  )?;
  let creature_id = tx.last_insert_rowid();

  if input.titan {
    tx.execute("INSERT INTO titans (creature_id) VALUES (?1)", [creature_id])?;
  }
  insert_values(
    tx,
    "INSERT INTO creature_weaknesses (creature_id, weakness) VALUES (?1, ?2)",
    creature_id,
    &input.weaknesses,
  )?;
  insert_values(
    tx,
    "INSERT INTO creature_habitats (creature_id, habitat) VALUES (?1, ?2)",
    creature_id,
    &input.habitats,
  )?;
  Ok(creature_id)
}

/// Log a sighting at the current time and return that time.
pub fn record_sighting(
  tx: &Transaction<'_>,
  creature_id: CreatureId,
  location: &str,
  reporter_id: HeroId,
) -> Result<DateTime<Utc>> {
  let sighted_at = now_timestamp();
  tx.execute(
    "INSERT INTO sighting_log (creature_id, sighted_at, location, reporter_id)
     VALUES (?1, ?2, ?3, ?4)",
    params![creature_id, encode_timestamp(sighted_at), location, reporter_id],
  )?;
  Ok(sighted_at)
}

/// Delete the sighting keyed by `(creature_id, sighted_at)`.
///
/// Stored keys have microsecond precision, so a timestamp with finer digits
/// names no sighting.
pub fn delete_sighting(
  tx: &Transaction<'_>,
  creature_id: CreatureId,
  sighted_at: DateTime<Utc>,
) -> Result<()> {
  if sighted_at.nanosecond() % 1_000 != 0 {
    return Err(CoreError::SightingNotFound { creature_id, sighted_at }.into());
  }
  let deleted = tx.execute(
    "DELETE FROM sighting_log WHERE creature_id = ?1 AND sighted_at = ?2",
    params![creature_id, encode_timestamp(sighted_at)],
  )?;
  if deleted == 0 {
    return Err(CoreError::SightingNotFound { creature_id, sighted_at }.into());
  }
  Ok(())
}

// ─── Deities, prophecies, encounters ─────────────────────────────────────────

pub fn create_deity(tx: &Transaction<'_>, input: &NewDeity) -> Result<DeityId> {
  tx.execute(
    "INSERT INTO deities (name, domain, symbol_of_power) VALUES (?1, ?2, ?3)",
    params![input.name, input.domain, input.symbol_of_power],
  )?;
  let deity_id = tx.last_insert_rowid();

  if let Some(seat) = &input.council {
    tx.execute(
      "INSERT INTO council_members (deity_id, seat_number, palace_location)
       VALUES (?1, ?2, ?3)",
      params![deity_id, seat.seat_number, seat.palace_location],
    )?;
  }
  Ok(deity_id)
}

pub fn create_prophecy(tx: &Transaction<'_>, input: &NewProphecy) -> Result<ProphecyId> {
  tx.execute(
    "INSERT INTO prophecies (full_text, date_issued, status) VALUES (?1, ?2, ?3)",
    params![input.full_text, encode_date(input.date_issued), input.status.as_str()],
  )?;
  Ok(tx.last_insert_rowid())
}

pub fn record_encounter(tx: &Transaction<'_>, input: &NewEncounter) -> Result<EncounterId> {
  tx.execute(
    "INSERT INTO encounters (hero_id, creature_id, encounter_date, location, outcome)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      input.hero_id,
      input.creature_id,
      encode_date(input.encounter_date),
      input.location,
      input.outcome,
    ],
  )?;
  Ok(tx.last_insert_rowid())
}

pub fn record_combat(tx: &Transaction<'_>, input: &NewCombat) -> Result<EncounterId> {
  tx.execute(
    "INSERT INTO combat_encounters (
       hero_id, creature_id, artifact_id, quest_id, encounter_date, result
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      input.hero_id,
      input.creature_id,
      input.artifact_id,
      input.quest_id,
      encode_date(input.encounter_date),
      encode_enum(input.result),
    ],
  )?;
  Ok(tx.last_insert_rowid())
}
