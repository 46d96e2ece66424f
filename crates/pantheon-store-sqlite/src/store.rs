//! [`SqliteStore`], the SQLite implementation of [`QueryService`] and
//! [`MutationService`].

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};

use pantheon_core::{
  Failure, Outcome, Report,
  model::{
    ArtifactId, CreatureId, DeityId, EncounterId, HeroId, HeroStatus,
    NewArtifact, NewCombat, NewCreature, NewDeity, NewEncounter, NewHero,
    NewProphecy, NewQuest, ProphecyId, QuestDeletion, QuestId, QuestOutcome,
    StatusChange,
  },
  report::{
    ArtifactSuccessRate, ArtifactWithWielder, CouncilSeatHolder,
    DangerousCreature, DatabaseStatistics, DivineParentQuests, HeroByParent,
    HeroEncounter, HeroProjection, Lookup, ProphecyCreatureLink,
    ProphecySummary, QuestDetail, QuestParticipant, Sighting,
    TitanThreatStats,
  },
  service::{MutationService, QueryService},
};

use crate::{Result, StoreConfig, mutation, query, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pantheon knowledge base backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. The
/// connection is the one session every operation runs through: reads inside
/// a deferred transaction, writes inside an immediate one.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  validate_wielder: bool,
}

impl SqliteStore {
  /// Open (or create) a store as described by `config` and run schema
  /// initialisation.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    Self::init(conn, config.validate_wielder).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, true).await
  }

  /// Turn wielder validation on or off for this handle.
  pub fn with_wielder_validation(mut self, validate: bool) -> Self {
    self.validate_wielder = validate;
    self
  }

  async fn init(conn: tokio_rusqlite::Connection, validate_wielder: bool) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, validate_wielder })
  }

  /// Run `f` inside a deferred read transaction.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Dropping the transaction ends it; nothing was written.
        Ok(f(&*tx))
      })
      .await?
  }

  /// Run `f` inside an immediate write transaction, committing if it returns
  /// `Ok` and rolling back otherwise.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => {
            tx.rollback()?;
            Ok(Err(e))
          }
        }
      })
      .await?
  }
}

// ─── Boundary conversion ─────────────────────────────────────────────────────

fn report<T: Default>(op: &'static str, result: Result<T>) -> Report<T> {
  match result {
    Ok(value) => {
      tracing::debug!(op, "query complete");
      Report::ok(value)
    }
    Err(e) => {
      tracing::error!(op, error = %e, "query failed");
      Report::failed(e.to_string())
    }
  }
}

fn outcome<T>(op: &'static str, result: Result<T>) -> Outcome<T> {
  match result {
    Ok(value) => {
      tracing::debug!(op, "mutation committed");
      Ok(value)
    }
    Err(e) => {
      if e.is_domain() {
        tracing::warn!(op, reason = %e, "mutation rejected");
      } else {
        tracing::error!(op, error = %e, "mutation rolled back");
      }
      Err(Failure::from(e))
    }
  }
}

// ─── QueryService impl ───────────────────────────────────────────────────────

impl QueryService for SqliteStore {
  async fn heroes_by_parent(&self, deity_name: &str) -> Report<Vec<HeroByParent>> {
    let name = deity_name.to_owned();
    report(
      "heroes_by_parent",
      self.read(move |conn| query::heroes_by_parent(conn, &name)).await,
    )
  }

  async fn quests_with_details(&self, outcome: Option<QuestOutcome>) -> Report<Vec<QuestDetail>> {
    report(
      "quests_with_details",
      self.read(move |conn| query::quests_with_details(conn, outcome)).await,
    )
  }

  async fn artifacts_and_wielders(&self) -> Report<Vec<ArtifactWithWielder>> {
    report(
      "artifacts_and_wielders",
      self.read(query::artifacts_and_wielders).await,
    )
  }

  async fn dangerous_creatures(&self, min_threat: i64) -> Report<Vec<DangerousCreature>> {
    report(
      "dangerous_creatures",
      self.read(move |conn| query::dangerous_creatures(conn, min_threat)).await,
    )
  }

  async fn active_prophecies_without_quest(&self) -> Report<Vec<ProphecySummary>> {
    report(
      "active_prophecies_without_quest",
      self.read(query::active_prophecies_without_quest).await,
    )
  }

  async fn hero_projection(&self) -> Report<Vec<HeroProjection>> {
    report("hero_projection", self.read(query::hero_projection).await)
  }

  async fn titan_threat_statistics(&self) -> Report<TitanThreatStats> {
    report(
      "titan_threat_statistics",
      self.read(query::titan_threat_statistics).await,
    )
  }

  async fn search_artifacts(&self, term: &str) -> Report<Vec<ArtifactWithWielder>> {
    let term = term.to_owned();
    report(
      "search_artifacts",
      self.read(move |conn| query::search_artifacts(conn, &term)).await,
    )
  }

  async fn quests_by_divine_parent(&self) -> Report<Vec<DivineParentQuests>> {
    report(
      "quests_by_divine_parent",
      self.read(query::quests_by_divine_parent).await,
    )
  }

  async fn database_statistics(&self) -> Report<DatabaseStatistics> {
    report("database_statistics", self.read(query::database_statistics).await)
  }

  async fn hero_encounters(&self, hero_id: HeroId) -> Report<Vec<HeroEncounter>> {
    report(
      "hero_encounters",
      self.read(move |conn| query::hero_encounters(conn, hero_id)).await,
    )
  }

  async fn quest_participants(&self, quest_id: QuestId) -> Report<Vec<QuestParticipant>> {
    report(
      "quest_participants",
      self.read(move |conn| query::quest_participants(conn, quest_id)).await,
    )
  }

  async fn olympian_council(&self) -> Report<Vec<CouncilSeatHolder>> {
    report("olympian_council", self.read(query::olympian_council).await)
  }

  async fn artifact_success_rates(&self, species: Option<&str>) -> Report<Vec<ArtifactSuccessRate>> {
    let species = species.map(str::to_owned);
    report(
      "artifact_success_rates",
      self
        .read(move |conn| query::artifact_success_rates(conn, species.as_deref()))
        .await,
    )
  }

  async fn prophecy_creature_correlation(&self) -> Report<Vec<ProphecyCreatureLink>> {
    report(
      "prophecy_creature_correlation",
      self.read(query::prophecy_creature_correlation).await,
    )
  }

  async fn recent_sightings(&self, limit: u32) -> Report<Vec<Sighting>> {
    report(
      "recent_sightings",
      self.read(move |conn| query::recent_sightings(conn, limit)).await,
    )
  }

  async fn hero_abilities(&self, hero_id: HeroId) -> Report<Vec<String>> {
    report(
      "hero_abilities",
      self.read(move |conn| query::hero_abilities(conn, hero_id)).await,
    )
  }

  async fn all_deities(&self) -> Report<Vec<Lookup>> {
    report("all_deities", self.read(query::all_deities).await)
  }

  async fn all_heroes(&self) -> Report<Vec<Lookup>> {
    report("all_heroes", self.read(query::all_heroes).await)
  }

  async fn all_creatures(&self) -> Report<Vec<Lookup>> {
    report("all_creatures", self.read(query::all_creatures).await)
  }

  async fn all_artifacts(&self) -> Report<Vec<Lookup>> {
    report("all_artifacts", self.read(query::all_artifacts).await)
  }

  async fn all_quests(&self) -> Report<Vec<Lookup>> {
    report("all_quests", self.read(query::all_quests).await)
  }

  async fn available_prophecies(&self) -> Report<Vec<Lookup>> {
    report("available_prophecies", self.read(query::available_prophecies).await)
  }
}

// ─── MutationService impl ────────────────────────────────────────────────────

impl MutationService for SqliteStore {
  async fn create_hero(&self, input: NewHero) -> Outcome<HeroId> {
    outcome(
      "create_hero",
      self.transact(move |tx| mutation::create_hero(tx, &input)).await,
    )
  }

  async fn create_quest(&self, input: NewQuest) -> Outcome<QuestId> {
    outcome(
      "create_quest",
      self.transact(move |tx| mutation::create_quest(tx, &input)).await,
    )
  }

  async fn record_sighting(
    &self,
    creature_id: CreatureId,
    location: &str,
    reporter_id: HeroId,
  ) -> Outcome<DateTime<Utc>> {
    let location = location.to_owned();
    outcome(
      "record_sighting",
      self
        .transact(move |tx| mutation::record_sighting(tx, creature_id, &location, reporter_id))
        .await,
    )
  }

  async fn set_hero_status(&self, hero_id: HeroId, status: HeroStatus) -> Outcome<StatusChange> {
    outcome(
      "set_hero_status",
      self
        .transact(move |tx| mutation::set_hero_status(tx, hero_id, status))
        .await,
    )
  }

  async fn set_quest_outcome(
    &self,
    quest_id: QuestId,
    outcome_value: QuestOutcome,
    end_date: Option<NaiveDate>,
  ) -> Outcome<()> {
    outcome(
      "set_quest_outcome",
      self
        .transact(move |tx| mutation::set_quest_outcome(tx, quest_id, outcome_value, end_date))
        .await,
    )
  }

  async fn set_artifact_wielder(
    &self,
    artifact_id: ArtifactId,
    wielder_id: Option<HeroId>,
  ) -> Outcome<()> {
    let validate = self.validate_wielder;
    outcome(
      "set_artifact_wielder",
      self
        .transact(move |tx| {
          mutation::set_artifact_wielder(tx, artifact_id, wielder_id, validate)
        })
        .await,
    )
  }

  async fn delete_sighting(&self, creature_id: CreatureId, sighted_at: DateTime<Utc>) -> Outcome<()> {
    outcome(
      "delete_sighting",
      self
        .transact(move |tx| mutation::delete_sighting(tx, creature_id, sighted_at))
        .await,
    )
  }

  async fn delete_quest(&self, quest_id: QuestId) -> Outcome<QuestDeletion> {
    let result = self.transact(move |tx| mutation::delete_quest(tx, quest_id)).await;
    if let Ok(deletion) = &result {
      tracing::info!(
        quest_id,
        removed = deletion.participations_removed,
        "quest deleted"
      );
    }
    outcome("delete_quest", result)
  }

  async fn remove_hero_ability(&self, hero_id: HeroId, ability: &str) -> Outcome<()> {
    let ability = ability.to_owned();
    outcome(
      "remove_hero_ability",
      self
        .transact(move |tx| mutation::remove_hero_ability(tx, hero_id, &ability))
        .await,
    )
  }

  async fn create_deity(&self, input: NewDeity) -> Outcome<DeityId> {
    outcome(
      "create_deity",
      self.transact(move |tx| mutation::create_deity(tx, &input)).await,
    )
  }

  async fn create_creature(&self, input: NewCreature) -> Outcome<CreatureId> {
    outcome(
      "create_creature",
      self.transact(move |tx| mutation::create_creature(tx, &input)).await,
    )
  }

  async fn create_artifact(&self, input: NewArtifact) -> Outcome<ArtifactId> {
    let validate = self.validate_wielder;
    outcome(
      "create_artifact",
      self
        .transact(move |tx| mutation::create_artifact(tx, &input, validate))
        .await,
    )
  }

  async fn create_prophecy(&self, input: NewProphecy) -> Outcome<ProphecyId> {
    outcome(
      "create_prophecy",
      self.transact(move |tx| mutation::create_prophecy(tx, &input)).await,
    )
  }

  async fn enlist_hero(&self, hero_id: HeroId, quest_id: QuestId, role: &str) -> Outcome<()> {
    let role = role.to_owned();
    outcome(
      "enlist_hero",
      self
        .transact(move |tx| mutation::enlist_hero(tx, hero_id, quest_id, &role))
        .await,
    )
  }

  async fn record_encounter(&self, input: NewEncounter) -> Outcome<EncounterId> {
    outcome(
      "record_encounter",
      self.transact(move |tx| mutation::record_encounter(tx, &input)).await,
    )
  }

  async fn record_combat(&self, input: NewCombat) -> Outcome<EncounterId> {
    outcome(
      "record_combat",
      self.transact(move |tx| mutation::record_combat(tx, &input)).await,
    )
  }
}
