//! The `QueryService` and `MutationService` traits.
//!
//! Both are implemented by storage backends (e.g. `pantheon-store-sqlite`).
//! Callers invoke one operation per user action with already-typed arguments
//! and render whatever comes back; no operation depends on caller state.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  model::{
    ArtifactId, CreatureId, DeityId, HeroId, HeroStatus, NewArtifact,
    NewCombat, NewCreature, NewDeity, NewEncounter, NewHero, NewProphecy,
    NewQuest, ProphecyId, QuestDeletion, QuestId, QuestOutcome, StatusChange,
    EncounterId,
  },
  outcome::{Outcome, Report},
  report::{
    ArtifactSuccessRate, ArtifactWithWielder, CouncilSeatHolder,
    DangerousCreature, DatabaseStatistics, DivineParentQuests, HeroByParent,
    HeroEncounter, HeroProjection, Lookup, ProphecyCreatureLink,
    ProphecySummary, QuestDetail, QuestParticipant, Sighting,
    TitanThreatStats,
  },
};

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Read-only, composed views over the knowledge base.
///
/// Never mutates state. A target that does not exist is not an error: the
/// report is simply empty.
pub trait QueryService: Send + Sync {
  /// Heroes whose divine parent is named `deity_name`, by first name.
  fn heroes_by_parent(
    &self,
    deity_name: &str,
  ) -> impl Future<Output = Report<Vec<HeroByParent>>> + Send;

  /// Every quest with its prophecy (if any), newest start date first.
  fn quests_with_details(
    &self,
    outcome: Option<QuestOutcome>,
  ) -> impl Future<Output = Report<Vec<QuestDetail>>> + Send;

  /// Every artifact with its wielder's name and its properties, by name.
  fn artifacts_and_wielders(
    &self,
  ) -> impl Future<Output = Report<Vec<ArtifactWithWielder>>> + Send;

  /// Creatures with a threat level of at least `min_threat`.
  fn dangerous_creatures(
    &self,
    min_threat: i64,
  ) -> impl Future<Output = Report<Vec<DangerousCreature>>> + Send;

  /// Unsettled prophecies that no quest has taken up.
  fn active_prophecies_without_quest(
    &self,
  ) -> impl Future<Output = Report<Vec<ProphecySummary>>> + Send;

  /// Names and divine parents of every hero, by last then first name.
  fn hero_projection(
    &self,
  ) -> impl Future<Output = Report<Vec<HeroProjection>>> + Send;

  /// Average/min/max threat over Titan-class creatures only.
  fn titan_threat_statistics(
    &self,
  ) -> impl Future<Output = Report<TitanThreatStats>> + Send;

  /// Case-insensitive substring search over artifact names and descriptions.
  fn search_artifacts(
    &self,
    term: &str,
  ) -> impl Future<Output = Report<Vec<ArtifactWithWielder>>> + Send;

  /// Quest activity grouped by the divine parent of participating heroes.
  fn quests_by_divine_parent(
    &self,
  ) -> impl Future<Output = Report<Vec<DivineParentQuests>>> + Send;

  /// Nine independent counts; all-or-nothing.
  fn database_statistics(
    &self,
  ) -> impl Future<Output = Report<DatabaseStatistics>> + Send;

  // ── Supplementary views ───────────────────────────────────────────────

  fn hero_encounters(
    &self,
    hero_id: HeroId,
  ) -> impl Future<Output = Report<Vec<HeroEncounter>>> + Send;

  fn quest_participants(
    &self,
    quest_id: QuestId,
  ) -> impl Future<Output = Report<Vec<QuestParticipant>>> + Send;

  fn olympian_council(
    &self,
  ) -> impl Future<Output = Report<Vec<CouncilSeatHolder>>> + Send;

  /// Combat success per hero, artifact and species, optionally restricted to
  /// one species.
  fn artifact_success_rates(
    &self,
    species: Option<&str>,
  ) -> impl Future<Output = Report<Vec<ArtifactSuccessRate>>> + Send;

  fn prophecy_creature_correlation(
    &self,
  ) -> impl Future<Output = Report<Vec<ProphecyCreatureLink>>> + Send;

  /// The `limit` most recent sightings.
  fn recent_sightings(
    &self,
    limit: u32,
  ) -> impl Future<Output = Report<Vec<Sighting>>> + Send;

  fn hero_abilities(
    &self,
    hero_id: HeroId,
  ) -> impl Future<Output = Report<Vec<String>>> + Send;

  // ── Lookups ───────────────────────────────────────────────────────────

  fn all_deities(&self) -> impl Future<Output = Report<Vec<Lookup>>> + Send;

  fn all_heroes(&self) -> impl Future<Output = Report<Vec<Lookup>>> + Send;

  fn all_creatures(&self) -> impl Future<Output = Report<Vec<Lookup>>> + Send;

  fn all_artifacts(&self) -> impl Future<Output = Report<Vec<Lookup>>> + Send;

  fn all_quests(&self) -> impl Future<Output = Report<Vec<Lookup>>> + Send;

  /// Prophecies not yet linked to a quest, whatever their status.
  fn available_prophecies(
    &self,
  ) -> impl Future<Output = Report<Vec<Lookup>>> + Send;
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Transactional writes.
///
/// Every operation is atomic: either every statement it issues commits, or
/// none does. Failures (violated preconditions, absent targets, storage
/// errors) are resolved into the [`Outcome`] and never leave a transaction
/// open.
pub trait MutationService: Send + Sync {
  /// Create a hero and its abilities. Fails with "parent not found" when
  /// `parent_id` names no deity.
  fn create_hero(
    &self,
    input: NewHero,
  ) -> impl Future<Output = Outcome<HeroId>> + Send;

  /// Create a quest. Fails with "prophecy already linked" when another quest
  /// already references `prophecy_id`.
  fn create_quest(
    &self,
    input: NewQuest,
  ) -> impl Future<Output = Outcome<QuestId>> + Send;

  /// Log a sighting stamped with the current time; returns that timestamp,
  /// which together with `creature_id` keys the new row.
  fn record_sighting(
    &self,
    creature_id: CreatureId,
    location: &str,
    reporter_id: HeroId,
  ) -> impl Future<Output = Outcome<DateTime<Utc>>> + Send;

  /// Set a hero's status. Moving to `Deceased` also closes every ongoing
  /// participation of that hero.
  fn set_hero_status(
    &self,
    hero_id: HeroId,
    status: HeroStatus,
  ) -> impl Future<Output = Outcome<StatusChange>> + Send;

  /// Set a quest's outcome, and its end date only when one is given.
  fn set_quest_outcome(
    &self,
    quest_id: QuestId,
    outcome: QuestOutcome,
    end_date: Option<NaiveDate>,
  ) -> impl Future<Output = Outcome<()>> + Send;

  /// Hand an artifact to a hero, or un-wield it with `None`.
  fn set_artifact_wielder(
    &self,
    artifact_id: ArtifactId,
    wielder_id: Option<HeroId>,
  ) -> impl Future<Output = Outcome<()>> + Send;

  /// Delete one sighting. `sighted_at` must match the stored key exactly,
  /// as returned by [`record_sighting`](Self::record_sighting); keys carry
  /// microsecond precision, so finer timestamps are reported as not found.
  fn delete_sighting(
    &self,
    creature_id: CreatureId,
    sighted_at: DateTime<Utc>,
  ) -> impl Future<Output = Outcome<()>> + Send;

  /// Delete a quest together with its participations, reporting how many
  /// participations went with it.
  fn delete_quest(
    &self,
    quest_id: QuestId,
  ) -> impl Future<Output = Outcome<QuestDeletion>> + Send;

  /// Remove one ability (exact text match) from a hero.
  fn remove_hero_ability(
    &self,
    hero_id: HeroId,
    ability: &str,
  ) -> impl Future<Output = Outcome<()>> + Send;

  // ── Supplementary creates ─────────────────────────────────────────────

  fn create_deity(
    &self,
    input: NewDeity,
  ) -> impl Future<Output = Outcome<DeityId>> + Send;

  fn create_creature(
    &self,
    input: NewCreature,
  ) -> impl Future<Output = Outcome<CreatureId>> + Send;

  fn create_artifact(
    &self,
    input: NewArtifact,
  ) -> impl Future<Output = Outcome<ArtifactId>> + Send;

  fn create_prophecy(
    &self,
    input: NewProphecy,
  ) -> impl Future<Output = Outcome<ProphecyId>> + Send;

  /// Add a hero to a quest with outcome `Ongoing`.
  fn enlist_hero(
    &self,
    hero_id: HeroId,
    quest_id: QuestId,
    role: &str,
  ) -> impl Future<Output = Outcome<()>> + Send;

  fn record_encounter(
    &self,
    input: NewEncounter,
  ) -> impl Future<Output = Outcome<EncounterId>> + Send;

  fn record_combat(
    &self,
    input: NewCombat,
  ) -> impl Future<Output = Outcome<EncounterId>> + Send;
}
