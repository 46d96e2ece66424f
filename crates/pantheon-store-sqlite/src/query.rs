//! Read-only query functions over an explicit SQLite session.
//!
//! Each function takes the connection (or an open transaction, which derefs
//! to one) it should read through, issues its statements and returns flat
//! report rows. None of them write. The async boundary in
//! [`SqliteStore`](crate::SqliteStore) runs them inside a deferred read
//! transaction.

use std::collections::HashMap;

use rusqlite::{Connection, Params, Row};

use pantheon_core::{
  model::{
    CombatResult, DeityId, HeroId, HeroStatus, QuestId, QuestOutcome,
  },
  report::{
    ArtifactSuccessRate, ArtifactWithWielder, CouncilSeatHolder,
    DangerousCreature, DatabaseStatistics, DivineParentQuests, HeroByParent,
    HeroEncounter, HeroProjection, Lookup, ProphecyCreatureLink,
    ProphecySummary, QuestDetail, QuestParticipant, Sighting,
    TitanThreatStats,
  },
};

use crate::{
  Result,
  encode::{encode_enum, parsed, parsed_opt},
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Prepare `sql`, map every row and collect.
fn collect<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Vec<T>>
where
  P: Params,
  F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params, map)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn lookups(conn: &Connection, sql: &str) -> Result<Vec<Lookup>> {
  collect(conn, sql, [], |row| {
    Ok(Lookup { id: row.get(0)?, label: row.get(1)? })
  })
}

/// Case-insensitive substring test; `folded_needle` is already lowercased.
///
/// SQLite's `LIKE` and `lower()` fold ASCII only.
fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
  haystack.to_lowercase().contains(folded_needle)
}

// ─── Composed views ──────────────────────────────────────────────────────────

pub fn heroes_by_parent(conn: &Connection, deity_name: &str) -> Result<Vec<HeroByParent>> {
  collect(
    conn,
    "SELECT h.hero_id, h.first_name, h.last_name, g.name,
            h.date_of_birth, h.fatal_flaw, h.status
     FROM heroes h
     JOIN deities g ON h.parent_id = g.deity_id
     WHERE g.name = ?1
     ORDER BY h.first_name, h.hero_id",
    [deity_name],
    |row| {
      Ok(HeroByParent {
        hero_id:       row.get(0)?,
        first_name:    row.get(1)?,
        last_name:     row.get(2)?,
        parent_name:   row.get(3)?,
        date_of_birth: parsed(row, 4)?,
        fatal_flaw:    row.get(5)?,
        status:        parsed(row, 6)?,
      })
    },
  )
}

pub fn quests_with_details(
  conn: &Connection,
  outcome: Option<QuestOutcome>,
) -> Result<Vec<QuestDetail>> {
  collect(
    conn,
    "SELECT q.quest_id, q.objective, q.start_date, q.end_date, q.outcome,
            p.full_text, p.status
     FROM quests q
     LEFT JOIN prophecies p ON q.prophecy_id = p.prophecy_id
     WHERE ?1 IS NULL OR q.outcome = ?1
     ORDER BY q.start_date DESC, q.quest_id DESC",
    [outcome.map(encode_enum)],
    |row| {
      Ok(QuestDetail {
        quest_id:        row.get(0)?,
        objective:       row.get(1)?,
        start_date:      parsed(row, 2)?,
        end_date:        parsed_opt(row, 3)?,
        outcome:         parsed(row, 4)?,
        prophecy_text:   row.get(5)?,
        prophecy_status: parsed_opt(row, 6)?,
      })
    },
  )
}

const ARTIFACT_SELECT: &str = "
  SELECT a.artifact_id, a.name, a.description,
         h.first_name || ' ' || h.last_name,
         COALESCE((SELECT group_concat(ap.property, ', ')
                   FROM artifact_properties ap
                   WHERE ap.artifact_id = a.artifact_id), '')
  FROM artifacts a
  LEFT JOIN heroes h ON a.wielder_id = h.hero_id";

fn artifact_row(row: &Row<'_>) -> rusqlite::Result<ArtifactWithWielder> {
  Ok(ArtifactWithWielder {
    artifact_id:  row.get(0)?,
    name:         row.get(1)?,
    description:  row.get(2)?,
    wielder_name: row.get(3)?,
    properties:   row.get(4)?,
  })
}

pub fn artifacts_and_wielders(conn: &Connection) -> Result<Vec<ArtifactWithWielder>> {
  let sql = format!("{ARTIFACT_SELECT} ORDER BY a.name, a.artifact_id");
  collect(conn, &sql, [], artifact_row)
}

/// Artifacts whose name or description contains `term`, ignoring case.
pub fn search_artifacts(conn: &Connection, term: &str) -> Result<Vec<ArtifactWithWielder>> {
  let needle = term.to_lowercase();
  let rows = artifacts_and_wielders(conn)?
    .into_iter()
    .filter(|a| contains_folded(&a.name, &needle) || contains_folded(&a.description, &needle))
    .collect();
  Ok(rows)
}

pub fn dangerous_creatures(conn: &Connection, min_threat: i64) -> Result<Vec<DangerousCreature>> {
  // Weakness and habitat rows are unique per creature (primary key), so the
  // concatenations are already distinct.
  collect(
    conn,
    "SELECT c.creature_id, c.species, c.threat_level,
            COALESCE((SELECT group_concat(w.weakness, ', ')
                      FROM creature_weaknesses w
                      WHERE w.creature_id = c.creature_id), ''),
            COALESCE((SELECT group_concat(x.habitat, ', ')
                      FROM creature_habitats x
                      WHERE x.creature_id = c.creature_id), ''),
            (SELECT COUNT(DISTINCT e.hero_id)
             FROM encounters e
             WHERE e.creature_id = c.creature_id) AS heroes_encountered
     FROM creatures c
     WHERE c.threat_level >= ?1
     ORDER BY c.threat_level DESC, heroes_encountered DESC, c.species",
    [min_threat],
    |row| {
      Ok(DangerousCreature {
        creature_id:        row.get(0)?,
        species:            row.get(1)?,
        threat_level:       row.get(2)?,
        weaknesses:         row.get(3)?,
        habitats:           row.get(4)?,
        heroes_encountered: row.get(5)?,
      })
    },
  )
}

/// Prophecies that no quest references and that are not yet settled (see
/// [`ProphecyStatus::is_settled`](pantheon_core::model::ProphecyStatus::is_settled)).
/// The "no quest" test is absence in an outer join.
pub fn active_prophecies_without_quest(conn: &Connection) -> Result<Vec<ProphecySummary>> {
  let unlinked = collect(
    conn,
    "SELECT p.prophecy_id, p.full_text, p.date_issued, p.status
     FROM prophecies p
     LEFT JOIN quests q ON q.prophecy_id = p.prophecy_id
     WHERE q.quest_id IS NULL
     ORDER BY p.date_issued DESC, p.prophecy_id DESC",
    [],
    |row| {
      Ok(ProphecySummary {
        prophecy_id: row.get(0)?,
        full_text:   row.get(1)?,
        date_issued: parsed(row, 2)?,
        status:      parsed(row, 3)?,
      })
    },
  )?;
  Ok(unlinked.into_iter().filter(|p| !p.status.is_settled()).collect())
}

pub fn hero_projection(conn: &Connection) -> Result<Vec<HeroProjection>> {
  collect(
    conn,
    "SELECT h.first_name, h.last_name, h.first_name || ' ' || h.last_name, g.name
     FROM heroes h
     LEFT JOIN deities g ON h.parent_id = g.deity_id
     ORDER BY h.last_name, h.first_name",
    [],
    |row| {
      Ok(HeroProjection {
        first_name:  row.get(0)?,
        last_name:   row.get(1)?,
        full_name:   row.get(2)?,
        parent_name: row.get(3)?,
      })
    },
  )
}

/// An aggregate without `GROUP BY` always yields exactly one row; over zero
/// Titans AVG/MIN/MAX are NULL and come back as `None`.
pub fn titan_threat_statistics(conn: &Connection) -> Result<TitanThreatStats> {
  let stats = conn.query_row(
    "SELECT ROUND(AVG(c.threat_level), 2), MIN(c.threat_level),
            MAX(c.threat_level), COUNT(*)
     FROM creatures c
     JOIN titans t ON t.creature_id = c.creature_id",
    [],
    |row| {
      Ok(TitanThreatStats {
        average_threat: row.get(0)?,
        min_threat:     row.get(1)?,
        max_threat:     row.get(2)?,
        titan_count:    row.get(3)?,
      })
    },
  )?;
  Ok(stats)
}

/// Quest activity per divine parent. Inner joins throughout: deities with no
/// participating children do not appear.
pub fn quests_by_divine_parent(conn: &Connection) -> Result<Vec<DivineParentQuests>> {
  let success = encode_enum(QuestOutcome::Success);

  let mut objectives: HashMap<DeityId, Vec<String>> = HashMap::new();
  for (deity_id, objective) in collect(
    conn,
    "SELECT DISTINCT h.parent_id, q.objective
     FROM heroes h
     JOIN quest_participations qp ON qp.hero_id = h.hero_id
     JOIN quests q ON q.quest_id = qp.quest_id
     WHERE h.parent_id IS NOT NULL
     ORDER BY h.parent_id, q.objective",
    [],
    |row| Ok((row.get::<_, DeityId>(0)?, row.get::<_, String>(1)?)),
  )? {
    objectives.entry(deity_id).or_default().push(objective);
  }

  collect(
    conn,
    "SELECT g.deity_id, g.name, g.domain,
            COUNT(DISTINCT q.quest_id) AS quest_count,
            COUNT(DISTINCT h.hero_id),
            COUNT(DISTINCT CASE WHEN q.outcome = ?1 THEN q.quest_id END) AS successes
     FROM deities g
     JOIN heroes h               ON h.parent_id = g.deity_id
     JOIN quest_participations qp ON qp.hero_id = h.hero_id
     JOIN quests q               ON q.quest_id = qp.quest_id
     GROUP BY g.deity_id, g.name, g.domain
     ORDER BY quest_count DESC, successes DESC, g.name",
    [success],
    |row| {
      let deity_id: DeityId = row.get(0)?;
      Ok(DivineParentQuests {
        deity_id,
        deity_name:          row.get(1)?,
        domain:              row.get(2)?,
        quest_count:         row.get(3)?,
        heroes_participated: row.get(4)?,
        successful_quests:   row.get(5)?,
        objectives:          objectives
          .get(&deity_id)
          .map(|o| o.join(" | "))
          .unwrap_or_default(),
      })
    },
  )
}

/// Nine independent counts in one statement, so they either all succeed or
/// the whole report fails.
pub fn database_statistics(conn: &Connection) -> Result<DatabaseStatistics> {
  let stats = conn.query_row(
    "SELECT (SELECT COUNT(*) FROM deities),
            (SELECT COUNT(*) FROM heroes),
            (SELECT COUNT(*) FROM heroes WHERE status = ?1),
            (SELECT COUNT(*) FROM creatures),
            (SELECT COUNT(*) FROM quests),
            (SELECT COUNT(*) FROM quests WHERE outcome = ?2),
            (SELECT COUNT(*) FROM artifacts),
            (SELECT COUNT(*) FROM encounters),
            (SELECT COUNT(*) FROM prophecies)",
    [
      encode_enum(HeroStatus::Active),
      encode_enum(QuestOutcome::Success),
    ],
    |row| {
      Ok(DatabaseStatistics {
        total_deities:    row.get(0)?,
        total_heroes:     row.get(1)?,
        active_heroes:    row.get(2)?,
        total_creatures:  row.get(3)?,
        total_quests:     row.get(4)?,
        completed_quests: row.get(5)?,
        total_artifacts:  row.get(6)?,
        total_encounters: row.get(7)?,
        total_prophecies: row.get(8)?,
      })
    },
  )?;
  Ok(stats)
}

// ─── Supplementary views ─────────────────────────────────────────────────────

pub fn hero_encounters(conn: &Connection, hero_id: HeroId) -> Result<Vec<HeroEncounter>> {
  collect(
    conn,
    "SELECT h.first_name, h.last_name, c.species, c.threat_level,
            e.encounter_date, e.location, e.outcome
     FROM encounters e
     JOIN heroes h    ON e.hero_id = h.hero_id
     JOIN creatures c ON e.creature_id = c.creature_id
     WHERE h.hero_id = ?1
     ORDER BY e.encounter_date DESC, e.encounter_id DESC",
    [hero_id],
    |row| {
      Ok(HeroEncounter {
        first_name:     row.get(0)?,
        last_name:      row.get(1)?,
        species:        row.get(2)?,
        threat_level:   row.get(3)?,
        encounter_date: parsed(row, 4)?,
        location:       row.get(5)?,
        outcome:        row.get(6)?,
      })
    },
  )
}

pub fn quest_participants(conn: &Connection, quest_id: QuestId) -> Result<Vec<QuestParticipant>> {
  collect(
    conn,
    "SELECT h.hero_id, h.first_name || ' ' || h.last_name, g.name,
            qp.role, qp.outcome,
            COALESCE((SELECT group_concat(ha.ability, ', ')
                      FROM hero_abilities ha
                      WHERE ha.hero_id = h.hero_id), '')
     FROM quest_participations qp
     JOIN heroes h       ON qp.hero_id = h.hero_id
     LEFT JOIN deities g ON h.parent_id = g.deity_id
     WHERE qp.quest_id = ?1
     ORDER BY qp.role, h.hero_id",
    [quest_id],
    |row| {
      Ok(QuestParticipant {
        hero_id:     row.get(0)?,
        hero_name:   row.get(1)?,
        parent_name: row.get(2)?,
        role:        row.get(3)?,
        outcome:     parsed(row, 4)?,
        abilities:   row.get(5)?,
      })
    },
  )
}

pub fn olympian_council(conn: &Connection) -> Result<Vec<CouncilSeatHolder>> {
  collect(
    conn,
    "SELECT o.seat_number, g.name, g.domain, g.symbol_of_power,
            o.palace_location,
            (SELECT COUNT(*) FROM heroes h WHERE h.parent_id = g.deity_id)
     FROM council_members o
     JOIN deities g ON o.deity_id = g.deity_id
     ORDER BY o.seat_number",
    [],
    |row| {
      Ok(CouncilSeatHolder {
        seat_number:     row.get(0)?,
        name:            row.get(1)?,
        domain:          row.get(2)?,
        symbol_of_power: row.get(3)?,
        palace_location: row.get(4)?,
        children:        row.get(5)?,
      })
    },
  )
}

pub fn artifact_success_rates(
  conn: &Connection,
  species: Option<&str>,
) -> Result<Vec<ArtifactSuccessRate>> {
  collect(
    conn,
    "SELECT h.first_name || ' ' || h.last_name, a.name, c.species,
            COUNT(*) AS total,
            SUM(CASE WHEN ce.result = ?1 THEN 1 ELSE 0 END),
            ROUND(SUM(CASE WHEN ce.result = ?1 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2) AS rate
     FROM combat_encounters ce
     JOIN heroes h    ON ce.hero_id = h.hero_id
     JOIN artifacts a ON ce.artifact_id = a.artifact_id
     JOIN creatures c ON ce.creature_id = c.creature_id
     WHERE ?2 IS NULL OR c.species = ?2
     GROUP BY h.hero_id, a.artifact_id, c.species
     ORDER BY rate DESC, total DESC, c.species, a.name",
    rusqlite::params![encode_enum(CombatResult::HeroVictory), species],
    |row| {
      Ok(ArtifactSuccessRate {
        hero_name:        row.get(0)?,
        artifact_name:    row.get(1)?,
        species:          row.get(2)?,
        total_encounters: row.get(3)?,
        victories:        row.get(4)?,
        success_rate:     row.get(5)?,
      })
    },
  )
}

pub fn prophecy_creature_correlation(conn: &Connection) -> Result<Vec<ProphecyCreatureLink>> {
  collect(
    conn,
    "SELECT p.prophecy_id, substr(p.full_text, 1, 100), p.status,
            q.objective, c.species, c.threat_level, COUNT(*) AS encounters
     FROM prophecies p
     JOIN quests q             ON q.prophecy_id = p.prophecy_id
     JOIN combat_encounters ce ON ce.quest_id = q.quest_id
     JOIN creatures c          ON ce.creature_id = c.creature_id
     GROUP BY p.prophecy_id, q.quest_id, c.creature_id
     ORDER BY p.prophecy_id, encounters DESC, c.species",
    [],
    |row| {
      Ok(ProphecyCreatureLink {
        prophecy_id:     row.get(0)?,
        prophecy_text:   row.get(1)?,
        prophecy_status: parsed(row, 2)?,
        quest_objective: row.get(3)?,
        species:         row.get(4)?,
        threat_level:    row.get(5)?,
        encounter_count: row.get(6)?,
      })
    },
  )
}

pub fn recent_sightings(conn: &Connection, limit: u32) -> Result<Vec<Sighting>> {
  collect(
    conn,
    "SELECT s.creature_id, c.species, s.sighted_at, s.location,
            h.first_name || ' ' || h.last_name
     FROM sighting_log s
     JOIN creatures c    ON s.creature_id = c.creature_id
     LEFT JOIN heroes h  ON s.reporter_id = h.hero_id
     ORDER BY s.sighted_at DESC
     LIMIT ?1",
    [limit],
    |row| {
      Ok(Sighting {
        creature_id: row.get(0)?,
        species:     row.get(1)?,
        sighted_at:  parsed(row, 2)?,
        location:    row.get(3)?,
        reporter:    row.get(4)?,
      })
    },
  )
}

pub fn hero_abilities(conn: &Connection, hero_id: HeroId) -> Result<Vec<String>> {
  collect(
    conn,
    "SELECT ability FROM hero_abilities WHERE hero_id = ?1 ORDER BY ability",
    [hero_id],
    |row| row.get(0),
  )
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub fn all_deities(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(conn, "SELECT deity_id, name FROM deities ORDER BY name")
}

pub fn all_heroes(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(
    conn,
    "SELECT hero_id, first_name || ' ' || last_name FROM heroes
     ORDER BY first_name, hero_id",
  )
}

pub fn all_creatures(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(conn, "SELECT creature_id, species FROM creatures ORDER BY species")
}

pub fn all_artifacts(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(conn, "SELECT artifact_id, name FROM artifacts ORDER BY name")
}

pub fn all_quests(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(conn, "SELECT quest_id, objective FROM quests ORDER BY quest_id DESC")
}

pub fn available_prophecies(conn: &Connection) -> Result<Vec<Lookup>> {
  lookups(
    conn,
    "SELECT p.prophecy_id, p.full_text
     FROM prophecies p
     LEFT JOIN quests q ON q.prophecy_id = p.prophecy_id
     WHERE q.quest_id IS NULL
     ORDER BY p.date_issued DESC, p.prophecy_id DESC",
  )
}
