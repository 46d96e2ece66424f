//! Report rows: the flat, read-only records produced by the query service.
//!
//! Rows are never stored; each is assembled on read from joins and
//! aggregations over the schema model. Aggregate strings are empty (not
//! absent) when there is nothing to join.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
  ArtifactId, CreatureId, DeityId, HeroId, HeroStatus,
  ParticipationOutcome, ProphecyId, ProphecyStatus, QuestId, QuestOutcome,
};

/// An identifier and display label, for populating selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
  pub id:    i64,
  pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroByParent {
  pub hero_id:       HeroId,
  pub first_name:    String,
  pub last_name:     String,
  pub parent_name:   String,
  pub date_of_birth: NaiveDate,
  pub fatal_flaw:    String,
  pub status:        HeroStatus,
}

/// A quest outer-joined to its prophecy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDetail {
  pub quest_id:        QuestId,
  pub objective:       String,
  pub start_date:      NaiveDate,
  pub end_date:        Option<NaiveDate>,
  pub outcome:         QuestOutcome,
  pub prophecy_text:   Option<String>,
  pub prophecy_status: Option<ProphecyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactWithWielder {
  pub artifact_id:  ArtifactId,
  pub name:         String,
  pub description:  String,
  /// `None` when unwielded or when the wielder reference dangles.
  pub wielder_name: Option<String>,
  /// Comma-joined artifact properties.
  pub properties:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerousCreature {
  pub creature_id:        CreatureId,
  pub species:            String,
  pub threat_level:       i64,
  pub weaknesses:         String,
  pub habitats:           String,
  /// Distinct heroes that have encountered this creature.
  pub heroes_encountered: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphecySummary {
  pub prophecy_id: ProphecyId,
  pub full_text:   String,
  pub date_issued: NaiveDate,
  pub status:      ProphecyStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroProjection {
  pub first_name:  String,
  pub last_name:   String,
  pub full_name:   String,
  pub parent_name: Option<String>,
}

/// Threat statistics over Titan-class creatures only.
///
/// With no Titans the count is zero and every other field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitanThreatStats {
  /// Rounded to two decimals.
  pub average_threat: Option<f64>,
  pub min_threat:     Option<i64>,
  pub max_threat:     Option<i64>,
  pub titan_count:    i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivineParentQuests {
  pub deity_id:            DeityId,
  pub deity_name:          String,
  pub domain:              String,
  pub quest_count:         i64,
  pub heroes_participated: i64,
  pub successful_quests:   i64,
  /// Pipe-joined distinct quest objectives.
  pub objectives:          String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStatistics {
  pub total_deities:    i64,
  pub total_heroes:     i64,
  pub active_heroes:    i64,
  pub total_creatures:  i64,
  pub total_quests:     i64,
  /// Quests whose outcome is `Success`.
  pub completed_quests: i64,
  pub total_artifacts:  i64,
  pub total_encounters: i64,
  pub total_prophecies: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroEncounter {
  pub first_name:     String,
  pub last_name:      String,
  pub species:        String,
  pub threat_level:   i64,
  pub encounter_date: NaiveDate,
  pub location:       String,
  pub outcome:        String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestParticipant {
  pub hero_id:     HeroId,
  pub hero_name:   String,
  pub parent_name: Option<String>,
  pub role:        String,
  pub outcome:     ParticipationOutcome,
  /// Comma-joined abilities of the hero.
  pub abilities:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilSeatHolder {
  pub seat_number:     i64,
  pub name:            String,
  pub domain:          String,
  pub symbol_of_power: Option<String>,
  pub palace_location: String,
  pub children:        i64,
}

/// Combat record of one hero wielding one artifact against one species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSuccessRate {
  pub hero_name:        String,
  pub artifact_name:    String,
  pub species:          String,
  pub total_encounters: i64,
  /// Encounters ending in a hero victory.
  pub victories:        i64,
  /// Percentage, rounded to two decimals.
  pub success_rate:     f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphecyCreatureLink {
  pub prophecy_id:     ProphecyId,
  /// First 100 characters of the prophecy text.
  pub prophecy_text:   String,
  pub prophecy_status: ProphecyStatus,
  pub quest_objective: String,
  pub species:         String,
  pub threat_level:    i64,
  pub encounter_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sighting {
  pub creature_id: CreatureId,
  pub species:     String,
  pub sighted_at:  DateTime<Utc>,
  pub location:    String,
  /// `None` when the reporting hero no longer exists.
  pub reporter:    Option<String>,
}

