//! Schema model: identifiers, status enumerations and create inputs.
//!
//! Every strong entity is keyed by a surrogate integer assigned by the store.
//! Weak entities (quest participations, sightings, multi-valued attribute
//! rows) are keyed by their owner plus a discriminating value and are removed
//! together with their owner.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── Identifiers ─────────────────────────────────────────────────────────────

pub type DeityId = i64;
pub type HeroId = i64;
pub type CreatureId = i64;
pub type ArtifactId = i64;
pub type ProphecyId = i64;
pub type QuestId = i64;
pub type EncounterId = i64;

// ─── Status enumerations ─────────────────────────────────────────────────────

/// Where a hero currently stands.
///
/// Any status may be set from any other; only the move into
/// [`HeroStatus::Deceased`] has a side effect (see
/// [`ParticipationOutcome::Deceased`]).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  Display, EnumString, IntoStaticStr,
)]
pub enum HeroStatus {
  #[default]
  Active,
  Deceased,
  Missing,
  Retired,
}

/// The overall result of a quest.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  Display, EnumString, IntoStaticStr,
)]
pub enum QuestOutcome {
  #[default]
  Ongoing,
  Success,
  Failure,
  Abandoned,
}

/// One hero's personal result within a quest.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  Display, EnumString, IntoStaticStr,
)]
pub enum ParticipationOutcome {
  #[default]
  Ongoing,
  Success,
  Failure,
  /// Terminal: set when the participant's hero is marked deceased while the
  /// participation was still ongoing.
  Deceased,
  Abandoned,
}

/// Where a prophecy stands.
///
/// The set is open: any other text is kept verbatim in
/// [`ProphecyStatus::Other`] and written back unchanged.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  EnumString,
)]
#[serde(from = "String", into = "String")]
pub enum ProphecyStatus {
  #[default]
  Active,
  Pending,
  Fulfilled,
  Failed,
  #[strum(default)]
  Other(String),
}

impl ProphecyStatus {
  /// The stored text form.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Active => "Active",
      Self::Pending => "Pending",
      Self::Fulfilled => "Fulfilled",
      Self::Failed => "Failed",
      Self::Other(status) => status,
    }
  }

  /// Fulfilled and failed prophecies no longer call for a quest.
  pub fn is_settled(&self) -> bool { matches!(self, Self::Fulfilled | Self::Failed) }
}

impl fmt::Display for ProphecyStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<String> for ProphecyStatus {
  fn from(status: String) -> Self {
    match status.parse() {
      Ok(known) => known,
      Err(_) => Self::Other(status),
    }
  }
}

impl From<ProphecyStatus> for String {
  fn from(status: ProphecyStatus) -> Self {
    match status {
      ProphecyStatus::Other(status) => status,
      known => known.as_str().to_owned(),
    }
  }
}

/// The result of a combat encounter, as seen from the hero's side.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
pub enum CombatResult {
  #[strum(serialize = "Hero Victory")]
  #[serde(rename = "Hero Victory")]
  HeroVictory,
  #[strum(serialize = "Creature Victory")]
  #[serde(rename = "Creature Victory")]
  CreatureVictory,
  Retreat,
  Stalemate,
}

// ─── Create inputs ───────────────────────────────────────────────────────────

/// A council seat held by a deity (the `CouncilMember` subtype).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilSeat {
  /// Unique across the council.
  pub seat_number:     i64,
  pub palace_location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeity {
  pub name:            String,
  pub domain:          String,
  pub symbol_of_power: Option<String>,
  pub council:         Option<CouncilSeat>,
}

impl NewDeity {
  pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
    Self {
      name:            name.into(),
      domain:          domain.into(),
      symbol_of_power: None,
      council:         None,
    }
  }
}

/// Input for creating a hero together with its known abilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHero {
  pub first_name:    String,
  pub last_name:     String,
  pub parent_id:     Option<DeityId>,
  pub date_of_birth: NaiveDate,
  pub fatal_flaw:    String,
  pub arrival_date:  NaiveDate,
  pub status:        HeroStatus,
  /// Inserted verbatim after trimming; blank entries are skipped and
  /// duplicates are not collapsed.
  pub abilities:     Vec<String>,
}

impl NewHero {
  /// Convenience constructor: no parent, `Active`, no abilities.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    date_of_birth: NaiveDate,
    fatal_flaw: impl Into<String>,
    arrival_date: NaiveDate,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      parent_id: None,
      date_of_birth,
      fatal_flaw: fatal_flaw.into(),
      arrival_date,
      status: HeroStatus::Active,
      abilities: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCreature {
  pub species:      String,
  pub threat_level: i64,
  /// Marks the creature as belonging to the Titan class.
  pub titan:        bool,
  pub weaknesses:   Vec<String>,
  pub habitats:     Vec<String>,
}

impl NewCreature {
  pub fn new(species: impl Into<String>, threat_level: i64) -> Self {
    Self {
      species: species.into(),
      threat_level,
      titan: false,
      weaknesses: Vec::new(),
      habitats: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArtifact {
  pub name:        String,
  pub description: String,
  pub wielder_id:  Option<HeroId>,
  pub properties:  Vec<String>,
}

impl NewArtifact {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name:        name.into(),
      description: description.into(),
      wielder_id:  None,
      properties:  Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProphecy {
  pub full_text:   String,
  pub date_issued: NaiveDate,
  pub status:      ProphecyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuest {
  pub objective:   String,
  pub start_date:  NaiveDate,
  pub outcome:     QuestOutcome,
  /// At most one quest may reference a given prophecy.
  pub prophecy_id: Option<ProphecyId>,
}

impl NewQuest {
  pub fn new(objective: impl Into<String>, start_date: NaiveDate) -> Self {
    Self {
      objective: objective.into(),
      start_date,
      outcome: QuestOutcome::Ongoing,
      prophecy_id: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEncounter {
  pub hero_id:        HeroId,
  pub creature_id:    CreatureId,
  pub encounter_date: NaiveDate,
  pub location:       String,
  pub outcome:        String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCombat {
  pub hero_id:        HeroId,
  pub creature_id:    CreatureId,
  pub artifact_id:    Option<ArtifactId>,
  pub quest_id:       Option<QuestId>,
  pub encounter_date: NaiveDate,
  pub result:         CombatResult,
}

// ─── Mutation payloads ───────────────────────────────────────────────────────

/// Payload of a successful status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
  pub hero_id:               HeroId,
  pub status:                HeroStatus,
  /// Ongoing participations moved to `Deceased` by this change.
  pub participations_closed: usize,
}

/// Payload of a successful quest deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDeletion {
  pub quest_id:               QuestId,
  pub participations_removed: usize,
}

impl fmt::Display for QuestDeletion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "quest {} deleted; {} quest participation entries also removed",
      self.quest_id, self.participations_removed
    )
  }
}
