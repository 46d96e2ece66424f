//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use pantheon_core::{
  FailureKind,
  model::{
    CombatResult, CouncilSeat, HeroStatus, NewArtifact, NewCombat,
    NewCreature, NewDeity, NewEncounter, NewHero, NewProphecy, NewQuest,
    ParticipationOutcome, ProphecyStatus, QuestOutcome,
  },
  service::{MutationService, QueryService},
};

use crate::{SqliteStore, StoreConfig};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn deity(s: &SqliteStore, name: &str) -> i64 {
  s.create_deity(NewDeity::new(name, "Sea")).await.unwrap()
}

async fn hero(s: &SqliteStore, first: &str, last: &str, parent: Option<i64>) -> i64 {
  let mut input = NewHero::new(first, last, date(1993, 8, 18), "Loyalty", date(2005, 6, 1));
  input.parent_id = parent;
  s.create_hero(input).await.unwrap()
}

async fn quest(s: &SqliteStore, objective: &str, start: NaiveDate) -> i64 {
  s.create_quest(NewQuest::new(objective, start)).await.unwrap()
}

async fn prophecy(s: &SqliteStore, text: &str, issued: NaiveDate, status: ProphecyStatus) -> i64 {
  s.create_prophecy(NewProphecy { full_text: text.into(), date_issued: issued, status })
    .await
    .unwrap()
}

async fn creature(s: &SqliteStore, species: &str, threat: i64, titan: bool) -> i64 {
  let mut input = NewCreature::new(species, threat);
  input.titan = titan;
  s.create_creature(input).await.unwrap()
}

fn sorted(joined: &str) -> Vec<&str> {
  let mut parts: Vec<&str> = joined.split(", ").filter(|p| !p.is_empty()).collect();
  parts.sort_unstable();
  parts
}

// ─── Heroes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_hero_inserts_trimmed_abilities() {
  let s = store().await;
  let poseidon = deity(&s, "Poseidon").await;

  let mut input = NewHero::new("Percy", "Jackson", date(1993, 8, 18), "Loyalty", date(2005, 6, 1));
  input.parent_id = Some(poseidon);
  input.abilities = vec!["  Hydrokinesis ".into(), "".into(), "   ".into(), "Swordplay".into()];

  let hero_id = s.create_hero(input).await.unwrap();

  let abilities = s.hero_abilities(hero_id).await.into_result().unwrap();
  assert_eq!(abilities, ["Hydrokinesis", "Swordplay"]);
}

#[tokio::test]
async fn create_hero_with_missing_parent_writes_nothing() {
  let s = store().await;

  let mut input = NewHero::new("Nico", "di Angelo", date(1994, 1, 28), "Grudges", date(2007, 12, 1));
  input.parent_id = Some(999);
  input.abilities = vec!["Shadow travel".into()];

  let failure = s.create_hero(input).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::Precondition);
  assert!(failure.message.starts_with("parent not found"));

  let stats = s.database_statistics().await.into_result().unwrap();
  assert_eq!(stats.total_heroes, 0);
  assert!(s.all_heroes().await.value.is_empty());
}

#[tokio::test]
async fn duplicate_abilities_fail_the_whole_create() {
  let s = store().await;

  let mut input = NewHero::new("Jason", "Grace", date(1994, 7, 1), "Ambition", date(2009, 12, 20));
  input.abilities = vec!["Flight".into(), "Flight".into()];

  let failure = s.create_hero(input).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::Storage);

  // The hero row inserted before the failing ability was rolled back.
  assert!(s.all_heroes().await.value.is_empty());
}

#[tokio::test]
async fn deceased_closes_only_ongoing_participations() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let ongoing = quest(&s, "Retrieve the bolt", date(2005, 6, 10)).await;
  let finished = quest(&s, "Sea of Monsters", date(2006, 6, 10)).await;
  let failed = quest(&s, "Rescue Artemis", date(2007, 12, 1)).await;

  s.enlist_hero(percy, ongoing, "Leader").await.unwrap();
  s.enlist_hero(percy, finished, "Leader").await.unwrap();
  s.enlist_hero(percy, failed, "Scout").await.unwrap();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE quest_participations SET outcome = 'Success' WHERE quest_id = ?1",
        [finished],
      )?;
      conn.execute(
        "UPDATE quest_participations SET outcome = 'Failure' WHERE quest_id = ?1",
        [failed],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let change = s.set_hero_status(percy, HeroStatus::Deceased).await.unwrap();
  assert_eq!(change.participations_closed, 1);

  for (quest_id, expected) in [
    (ongoing, ParticipationOutcome::Deceased),
    (finished, ParticipationOutcome::Success),
    (failed, ParticipationOutcome::Failure),
  ] {
    let rows = s.quest_participants(quest_id).await.into_result().unwrap();
    assert_eq!(rows[0].outcome, expected, "quest {quest_id}");
  }
}

#[tokio::test]
async fn other_statuses_leave_participations_alone() {
  let s = store().await;
  let grover = hero(&s, "Grover", "Underwood", None).await;
  let q = quest(&s, "Find Pan", date(2005, 1, 1)).await;
  s.enlist_hero(grover, q, "Searcher").await.unwrap();

  let change = s.set_hero_status(grover, HeroStatus::Missing).await.unwrap();
  assert_eq!(change.participations_closed, 0);

  // Any status may follow any other.
  s.set_hero_status(grover, HeroStatus::Active).await.unwrap();

  let rows = s.quest_participants(q).await.value;
  assert_eq!(rows[0].outcome, ParticipationOutcome::Ongoing);
}

#[tokio::test]
async fn set_status_of_missing_hero_is_not_found() {
  let s = store().await;
  let failure = s.set_hero_status(42, HeroStatus::Retired).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn removing_an_ability_twice_fails_the_second_time() {
  let s = store().await;
  let mut input = NewHero::new("Annabeth", "Chase", date(1993, 7, 12), "Hubris", date(2000, 1, 1));
  input.abilities = vec!["Strategy".into(), "Architecture".into()];
  let annabeth = s.create_hero(input).await.unwrap();

  s.remove_hero_ability(annabeth, "Strategy").await.unwrap();
  let abilities = s.hero_abilities(annabeth).await.value;
  assert_eq!(abilities, ["Architecture"]);

  let failure = s.remove_hero_ability(annabeth, "Strategy").await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

// ─── Quests ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn a_prophecy_links_to_at_most_one_quest() {
  let s = store().await;
  let p = prophecy(&s, "You shall go west", date(2005, 6, 1), ProphecyStatus::Active).await;

  let mut first = NewQuest::new("Retrieve the bolt", date(2005, 6, 10));
  first.prophecy_id = Some(p);
  s.create_quest(first.clone()).await.unwrap();

  for _ in 0..2 {
    let failure = s.create_quest(first.clone()).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Precondition);
    assert!(failure.message.starts_with("prophecy already linked"));
  }

  assert_eq!(s.all_quests().await.value.len(), 1);
}

#[tokio::test]
async fn omitted_end_date_is_left_unchanged() {
  let s = store().await;
  let q = quest(&s, "Labyrinth", date(2008, 6, 1)).await;

  s.set_quest_outcome(q, QuestOutcome::Failure, Some(date(2008, 6, 20)))
    .await
    .unwrap();
  s.set_quest_outcome(q, QuestOutcome::Success, None).await.unwrap();

  let rows = s.quests_with_details(None).await.value;
  assert_eq!(rows[0].outcome, QuestOutcome::Success);
  assert_eq!(rows[0].end_date, Some(date(2008, 6, 20)));
}

#[tokio::test]
async fn set_outcome_of_missing_quest_is_not_found() {
  let s = store().await;
  let failure = s
    .set_quest_outcome(7, QuestOutcome::Abandoned, None)
    .await
    .unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn delete_quest_cascades_and_reports_count() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let annabeth = hero(&s, "Annabeth", "Chase", None).await;
  let doomed = quest(&s, "Battle of Manhattan", date(2009, 8, 18)).await;
  let kept = quest(&s, "Son of Neptune", date(2010, 1, 1)).await;

  s.enlist_hero(percy, doomed, "Leader").await.unwrap();
  s.enlist_hero(annabeth, doomed, "Strategist").await.unwrap();
  s.enlist_hero(percy, kept, "Leader").await.unwrap();

  let deletion = s.delete_quest(doomed).await.unwrap();
  assert_eq!(deletion.participations_removed, 2);
  assert!(deletion.to_string().contains("2 quest participation"));

  let left: i64 = s
    .conn
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT COUNT(*) FROM quest_participations WHERE quest_id = ?1",
        [doomed],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(left, 0);
  assert_eq!(s.quest_participants(kept).await.value.len(), 1);

  let failure = s.delete_quest(doomed).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn enlisting_requires_hero_and_quest() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let q = quest(&s, "Titan's Curse", date(2007, 12, 1)).await;

  assert_eq!(
    s.enlist_hero(99, q, "Leader").await.unwrap_err().kind,
    FailureKind::NotFound
  );
  assert_eq!(
    s.enlist_hero(percy, 99, "Leader").await.unwrap_err().kind,
    FailureKind::NotFound
  );

  s.enlist_hero(percy, q, "Leader").await.unwrap();
  assert_eq!(
    s.enlist_hero(percy, q, "Leader").await.unwrap_err().kind,
    FailureKind::Precondition
  );
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn wielder_is_validated_by_default() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let riptide = s
    .create_artifact(NewArtifact::new("Riptide", "a bronze sword"))
    .await
    .unwrap();

  let failure = s.set_artifact_wielder(riptide, Some(404)).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::Precondition);

  s.set_artifact_wielder(riptide, Some(percy)).await.unwrap();
  let rows = s.artifacts_and_wielders().await.value;
  assert_eq!(rows[0].wielder_name.as_deref(), Some("Percy Jackson"));

  s.set_artifact_wielder(riptide, None).await.unwrap();
  let rows = s.artifacts_and_wielders().await.value;
  assert_eq!(rows[0].wielder_name, None);
}

#[tokio::test]
async fn unvalidated_wielder_accepts_dangling_ids() {
  let s = store().await.with_wielder_validation(false);
  let aegis = s
    .create_artifact(NewArtifact::new("Aegis", "a shield"))
    .await
    .unwrap();

  s.set_artifact_wielder(aegis, Some(404)).await.unwrap();
  let rows = s.artifacts_and_wielders().await.value;
  assert_eq!(rows[0].wielder_name, None);
}

#[tokio::test]
async fn config_can_turn_wielder_validation_off() {
  let mut config = StoreConfig::new(":memory:");
  config.validate_wielder = false;
  let s = SqliteStore::open(&config).await.expect("in-memory store");

  let mut orphaned = NewArtifact::new("Golden Fleece", "heals the land");
  orphaned.wielder_id = Some(404);
  s.create_artifact(orphaned).await.unwrap();
  assert_eq!(s.all_artifacts().await.value.len(), 1);
}

#[tokio::test]
async fn wielding_a_missing_artifact_is_not_found() {
  let s = store().await;
  let failure = s.set_artifact_wielder(5, None).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn artifacts_aggregate_properties() {
  let s = store().await;
  let mut helm = NewArtifact::new("Helm of Darkness", "grants invisibility");
  helm.properties = vec!["Invisibility".into(), "Fear aura".into()];
  s.create_artifact(helm).await.unwrap();
  s.create_artifact(NewArtifact::new("Caduceus", "a staff")).await.unwrap();

  let rows = s.artifacts_and_wielders().await.into_result().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].name, "Caduceus");
  assert_eq!(rows[0].properties, "");
  assert_eq!(sorted(&rows[1].properties), ["Fear aura", "Invisibility"]);
}

#[tokio::test]
async fn search_matches_name_or_description() {
  let s = store().await;
  s.create_artifact(NewArtifact::new("Aegis Shield", "a golden blade"))
    .await
    .unwrap();
  s.create_artifact(NewArtifact::new("Storm Blade", "forged in storms"))
    .await
    .unwrap();
  s.create_artifact(NewArtifact::new("Golden Fleece", "heals the land"))
    .await
    .unwrap();

  let rows = s.search_artifacts("Blade").await.into_result().unwrap();
  let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["Aegis Shield", "Storm Blade"]);

  let rows = s.search_artifacts("bLaDe").await.value;
  assert_eq!(rows.len(), 2);

  assert!(s.search_artifacts("100%").await.value.is_empty());
}

#[tokio::test]
async fn search_folds_case_beyond_ascii() {
  let s = store().await;
  s.create_artifact(NewArtifact::new("ÆGIS", "shield of Zeus"))
    .await
    .unwrap();
  s.create_artifact(NewArtifact::new("Caduceus", "staff of Hermès"))
    .await
    .unwrap();

  let rows = s.search_artifacts("ægis").await.into_result().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].name, "ÆGIS");

  let rows = s.search_artifacts("HERMÈS").await.into_result().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].name, "Caduceus");
}

// ─── Creatures & sightings ───────────────────────────────────────────────────

#[tokio::test]
async fn titan_statistics_ignore_non_titans() {
  let s = store().await;
  creature(&s, "Kronos", 9, true).await;
  creature(&s, "Hyperion", 7, true).await;
  creature(&s, "Atlas", 4, true).await;
  creature(&s, "Typhon", 10, false).await;

  let stats = s.titan_threat_statistics().await.into_result().unwrap();
  assert_eq!(stats.average_threat, Some(6.67));
  assert_eq!(stats.min_threat, Some(4));
  assert_eq!(stats.max_threat, Some(9));
  assert_eq!(stats.titan_count, 3);
}

#[tokio::test]
async fn titan_statistics_without_titans_are_null() {
  let s = store().await;
  creature(&s, "Minotaur", 6, false).await;

  let stats = s.titan_threat_statistics().await.into_result().unwrap();
  assert_eq!(stats, Default::default());
}

#[tokio::test]
async fn dangerous_creatures_rank_by_threat_then_encounters() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let annabeth = hero(&s, "Annabeth", "Chase", None).await;

  let mut hydra = NewCreature::new("Hydra", 8);
  hydra.weaknesses = vec!["Fire".into(), "Decapitation by fire".into()];
  hydra.habitats = vec!["Swamps".into()];
  let hydra = s.create_creature(hydra).await.unwrap();
  let chimera = creature(&s, "Chimera", 8, false).await;
  creature(&s, "Cyclops", 6, false).await;
  creature(&s, "Kampe", 9, false).await;

  for (who, what) in [(percy, hydra), (annabeth, hydra), (percy, hydra), (percy, chimera)] {
    s.record_encounter(NewEncounter {
      hero_id:        who,
      creature_id:    what,
      encounter_date: date(2006, 6, 1),
      location:       "Camp".into(),
      outcome:        "Survived".into(),
    })
    .await
    .unwrap();
  }

  let rows = s.dangerous_creatures(7).await.into_result().unwrap();
  let species: Vec<_> = rows.iter().map(|r| r.species.as_str()).collect();
  assert_eq!(species, ["Kampe", "Hydra", "Chimera"]);

  let hydra_row = &rows[1];
  assert_eq!(hydra_row.heroes_encountered, 2);
  assert_eq!(sorted(&hydra_row.weaknesses), ["Decapitation by fire", "Fire"]);
  assert_eq!(hydra_row.habitats, "Swamps");
  assert_eq!(rows[0].weaknesses, "");
}

#[tokio::test]
async fn sightings_are_keyed_by_creature_and_time() {
  let s = store().await;
  let grover = hero(&s, "Grover", "Underwood", None).await;
  let minotaur = creature(&s, "Minotaur", 6, false).await;

  let at = s.record_sighting(minotaur, "Half-Blood Hill", grover).await.unwrap();

  let recent = s.recent_sightings(10).await.into_result().unwrap();
  assert_eq!(recent.len(), 1);
  assert_eq!(recent[0].sighted_at, at);
  assert_eq!(recent[0].reporter.as_deref(), Some("Grover Underwood"));

  s.delete_sighting(minotaur, at).await.unwrap();
  assert!(s.recent_sightings(10).await.value.is_empty());

  let failure = s.delete_sighting(minotaur, at).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn sighting_of_unknown_creature_is_a_storage_failure() {
  let s = store().await;
  let grover = hero(&s, "Grover", "Underwood", None).await;

  let failure = s.record_sighting(77, "Nowhere", grover).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::Storage);
}

#[tokio::test]
async fn sighting_key_finer_than_stored_precision_is_not_found() {
  let s = store().await;
  let grover = hero(&s, "Grover", "Underwood", None).await;
  let minotaur = creature(&s, "Minotaur", 6, false).await;

  let at = s.record_sighting(minotaur, "Half-Blood Hill", grover).await.unwrap();
  let finer = at + chrono::Duration::nanoseconds(1);

  let failure = s.delete_sighting(minotaur, finer).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::NotFound);
  assert_eq!(s.recent_sightings(10).await.value.len(), 1);

  s.delete_sighting(minotaur, at).await.unwrap();
  assert!(s.recent_sightings(10).await.value.is_empty());
}

// ─── Composed views ──────────────────────────────────────────────────────────

#[tokio::test]
async fn heroes_by_parent_orders_by_first_name() {
  let s = store().await;
  let poseidon = deity(&s, "Poseidon").await;
  let athena = deity(&s, "Athena").await;
  hero(&s, "Tyson", "Cyclops", Some(poseidon)).await;
  hero(&s, "Percy", "Jackson", Some(poseidon)).await;
  hero(&s, "Annabeth", "Chase", Some(athena)).await;

  let rows = s.heroes_by_parent("Poseidon").await.into_result().unwrap();
  let names: Vec<_> = rows.iter().map(|r| r.first_name.as_str()).collect();
  assert_eq!(names, ["Percy", "Tyson"]);
  assert!(rows.iter().all(|r| r.parent_name == "Poseidon"));
  assert_eq!(rows[0].status, HeroStatus::Active);

  let none = s.heroes_by_parent("Hestia").await;
  assert!(none.is_ok());
  assert!(none.value.is_empty());
}

#[tokio::test]
async fn quests_join_their_prophecy_when_present() {
  let s = store().await;
  let p = prophecy(&s, "Five shall go west", date(2007, 11, 1), ProphecyStatus::Fulfilled).await;

  let mut foretold = NewQuest::new("Rescue Artemis", date(2007, 12, 1));
  foretold.prophecy_id = Some(p);
  foretold.outcome = QuestOutcome::Success;
  s.create_quest(foretold).await.unwrap();
  quest(&s, "Explore the Labyrinth", date(2008, 6, 1)).await;

  let rows = s.quests_with_details(None).await.into_result().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].objective, "Explore the Labyrinth");
  assert_eq!(rows[0].prophecy_text, None);
  assert_eq!(rows[1].prophecy_text.as_deref(), Some("Five shall go west"));
  assert_eq!(rows[1].prophecy_status, Some(ProphecyStatus::Fulfilled));

  let successes = s
    .quests_with_details(Some(QuestOutcome::Success))
    .await
    .value;
  assert_eq!(successes.len(), 1);
  assert_eq!(successes[0].objective, "Rescue Artemis");
}

#[tokio::test]
async fn active_prophecies_exclude_linked_and_settled() {
  let s = store().await;
  let linked = prophecy(&s, "linked", date(2005, 1, 1), ProphecyStatus::Active).await;
  prophecy(&s, "fulfilled", date(2005, 2, 1), ProphecyStatus::Fulfilled).await;
  prophecy(&s, "failed", date(2005, 3, 1), ProphecyStatus::Failed).await;
  prophecy(&s, "older", date(2004, 1, 1), ProphecyStatus::Active).await;
  prophecy(&s, "newer", date(2006, 1, 1), ProphecyStatus::Pending).await;

  let mut q = NewQuest::new("follow it", date(2005, 1, 2));
  q.prophecy_id = Some(linked);
  s.create_quest(q).await.unwrap();

  let rows = s.active_prophecies_without_quest().await.into_result().unwrap();
  let texts: Vec<_> = rows.iter().map(|r| r.full_text.as_str()).collect();
  assert_eq!(texts, ["newer", "older"]);

  // The lookup lists every unlinked prophecy, settled or not.
  let available = s.available_prophecies().await.value;
  assert_eq!(available.len(), 4);
  assert!(available.iter().all(|l| l.id != linked));
}

#[tokio::test]
async fn unlisted_prophecy_status_does_not_hide_other_rows() {
  let s = store().await;
  prophecy(&s, "The sea will rise", date(2006, 1, 1), ProphecyStatus::Active).await;
  prophecy(&s, "Done and dusted", date(2006, 2, 1), ProphecyStatus::Fulfilled).await;
  let dormant: i64 = s
    .conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO prophecies (full_text, date_issued, status)
         VALUES ('A sleeper wakes', '2007-01-01', 'Dormant')",
        [],
      )?;
      Ok(conn.last_insert_rowid())
    })
    .await
    .unwrap();
  let whispered = prophecy(
    &s,
    "Whispered at Delphi",
    date(2005, 1, 1),
    ProphecyStatus::Other("Whispered".into()),
  )
  .await;

  let rows = s.active_prophecies_without_quest().await.into_result().unwrap();
  let statuses: Vec<_> = rows.iter().map(|r| r.status.to_string()).collect();
  assert_eq!(statuses, ["Dormant", "Active", "Whispered"]);
  assert_eq!(rows[0].prophecy_id, dormant);
  assert_eq!(rows[2].prophecy_id, whispered);

  let mut q = NewQuest::new("Wake the sleeper", date(2007, 2, 1));
  q.prophecy_id = Some(dormant);
  s.create_quest(q).await.unwrap();
  let quests = s.quests_with_details(None).await.into_result().unwrap();
  assert_eq!(
    quests[0].prophecy_status,
    Some(ProphecyStatus::Other("Dormant".into()))
  );
}

#[tokio::test]
async fn projection_lists_names_and_parents() {
  let s = store().await;
  let poseidon = deity(&s, "Poseidon").await;
  hero(&s, "Percy", "Jackson", Some(poseidon)).await;
  hero(&s, "Annabeth", "Chase", None).await;

  let rows = s.hero_projection().await.into_result().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].full_name, "Annabeth Chase");
  assert_eq!(rows[0].parent_name, None);
  assert_eq!(rows[1].full_name, "Percy Jackson");
  assert_eq!(rows[1].parent_name.as_deref(), Some("Poseidon"));
}

#[tokio::test]
async fn divine_parent_report_counts_distinct_quests() {
  let s = store().await;
  let poseidon = deity(&s, "Poseidon").await;
  let athena = deity(&s, "Athena").await;
  deity(&s, "Hestia").await;

  let percy = hero(&s, "Percy", "Jackson", Some(poseidon)).await;
  let tyson = hero(&s, "Tyson", "Cyclops", Some(poseidon)).await;
  let annabeth = hero(&s, "Annabeth", "Chase", Some(athena)).await;
  hero(&s, "Orphan", "Nobody", None).await;

  let mut sea = NewQuest::new("Sea of Monsters", date(2006, 6, 1));
  sea.outcome = QuestOutcome::Success;
  let sea = s.create_quest(sea).await.unwrap();
  let bolt = quest(&s, "Retrieve the bolt", date(2005, 6, 1)).await;

  s.enlist_hero(percy, sea, "Leader").await.unwrap();
  s.enlist_hero(tyson, sea, "Muscle").await.unwrap();
  s.enlist_hero(percy, bolt, "Leader").await.unwrap();
  s.enlist_hero(annabeth, bolt, "Strategist").await.unwrap();

  let rows = s.quests_by_divine_parent().await.into_result().unwrap();
  assert_eq!(rows.len(), 2);

  let p = &rows[0];
  assert_eq!(p.deity_name, "Poseidon");
  assert_eq!(p.quest_count, 2);
  assert_eq!(p.heroes_participated, 2);
  assert_eq!(p.successful_quests, 1);
  assert_eq!(p.objectives, "Retrieve the bolt | Sea of Monsters");

  let a = &rows[1];
  assert_eq!(a.deity_name, "Athena");
  assert_eq!(a.quest_count, 1);
  assert_eq!(a.successful_quests, 0);
}

#[tokio::test]
async fn statistics_count_every_table() {
  let s = store().await;
  let zeus = deity(&s, "Zeus").await;
  let thalia = hero(&s, "Thalia", "Grace", Some(zeus)).await;
  let luke = hero(&s, "Luke", "Castellan", None).await;
  s.set_hero_status(luke, HeroStatus::Deceased).await.unwrap();
  let kronos = creature(&s, "Kronos", 10, true).await;
  let mut done = NewQuest::new("Defeat Kronos", date(2009, 8, 18));
  done.outcome = QuestOutcome::Success;
  s.create_quest(done).await.unwrap();
  quest(&s, "Rebuild Olympus", date(2009, 8, 20)).await;
  s.create_artifact(NewArtifact::new("Master Bolt", "lightning")).await.unwrap();
  s.record_encounter(NewEncounter {
    hero_id:        thalia,
    creature_id:    kronos,
    encounter_date: date(2009, 8, 18),
    location:       "Olympus".into(),
    outcome:        "Victory".into(),
  })
  .await
  .unwrap();
  prophecy(&s, "The great prophecy", date(1945, 1, 1), ProphecyStatus::Fulfilled).await;

  let stats = s.database_statistics().await.into_result().unwrap();
  assert_eq!(stats.total_deities, 1);
  assert_eq!(stats.total_heroes, 2);
  assert_eq!(stats.active_heroes, 1);
  assert_eq!(stats.total_creatures, 1);
  assert_eq!(stats.total_quests, 2);
  assert_eq!(stats.completed_quests, 1);
  assert_eq!(stats.total_artifacts, 1);
  assert_eq!(stats.total_encounters, 1);
  assert_eq!(stats.total_prophecies, 1);
}

#[tokio::test]
async fn storage_failure_empties_the_report() {
  let s = store().await;
  deity(&s, "Zeus").await;
  s.conn
    .call(|conn| {
      conn.execute_batch("DROP TABLE encounters;")?;
      Ok(())
    })
    .await
    .unwrap();

  let report = s.database_statistics().await;
  assert!(report.error.is_some());
  assert_eq!(report.value, Default::default());

  // Unaffected reads still work.
  assert_eq!(s.all_deities().await.value.len(), 1);
}

// ─── Supplementary views ─────────────────────────────────────────────────────

#[tokio::test]
async fn council_lists_seats_with_children() {
  let s = store().await;
  let mut zeus = NewDeity::new("Zeus", "Sky");
  zeus.symbol_of_power = Some("Master Bolt".into());
  zeus.council = Some(CouncilSeat { seat_number: 1, palace_location: "Olympus".into() });
  let zeus = s.create_deity(zeus).await.unwrap();
  let mut hera = NewDeity::new("Hera", "Marriage");
  hera.council = Some(CouncilSeat { seat_number: 2, palace_location: "Olympus".into() });
  s.create_deity(hera).await.unwrap();
  deity(&s, "Hecate").await;
  hero(&s, "Thalia", "Grace", Some(zeus)).await;
  hero(&s, "Jason", "Grace", Some(zeus)).await;

  let rows = s.olympian_council().await.into_result().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].name, "Zeus");
  assert_eq!(rows[0].children, 2);
  assert_eq!(rows[0].symbol_of_power.as_deref(), Some("Master Bolt"));
  assert_eq!(rows[1].children, 0);

  // Seat numbers are unique.
  let mut usurper = NewDeity::new("Kronos", "Time");
  usurper.council = Some(CouncilSeat { seat_number: 1, palace_location: "Othrys".into() });
  let failure = s.create_deity(usurper).await.unwrap_err();
  assert_eq!(failure.kind, FailureKind::Storage);
  assert_eq!(s.all_deities().await.value.len(), 3);
}

#[tokio::test]
async fn combat_reports_success_rates_and_prophecy_links() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let riptide = s
    .create_artifact(NewArtifact::new("Riptide", "a bronze sword"))
    .await
    .unwrap();
  let hydra = creature(&s, "Hydra", 8, false).await;
  let p = prophecy(&s, "You shall go west", date(2005, 6, 1), ProphecyStatus::Fulfilled).await;
  let mut west = NewQuest::new("Go west", date(2005, 6, 2));
  west.prophecy_id = Some(p);
  let west = s.create_quest(west).await.unwrap();

  for result in [CombatResult::HeroVictory, CombatResult::HeroVictory, CombatResult::Retreat] {
    s.record_combat(NewCombat {
      hero_id:        percy,
      creature_id:    hydra,
      artifact_id:    Some(riptide),
      quest_id:       Some(west),
      encounter_date: date(2005, 6, 5),
      result,
    })
    .await
    .unwrap();
  }

  let rates = s.artifact_success_rates(Some("Hydra")).await.into_result().unwrap();
  assert_eq!(rates.len(), 1);
  assert_eq!(rates[0].hero_name, "Percy Jackson");
  assert_eq!(rates[0].total_encounters, 3);
  assert_eq!(rates[0].victories, 2);
  assert_eq!(rates[0].success_rate, 66.67);
  assert!(s.artifact_success_rates(Some("Sphinx")).await.value.is_empty());
  assert_eq!(s.artifact_success_rates(None).await.value.len(), 1);

  let links = s.prophecy_creature_correlation().await.into_result().unwrap();
  assert_eq!(links.len(), 1);
  assert_eq!(links[0].quest_objective, "Go west");
  assert_eq!(links[0].species, "Hydra");
  assert_eq!(links[0].encounter_count, 3);
}

#[tokio::test]
async fn hero_encounters_newest_first() {
  let s = store().await;
  let percy = hero(&s, "Percy", "Jackson", None).await;
  let other = hero(&s, "Clarisse", "La Rue", None).await;
  let minotaur = creature(&s, "Minotaur", 6, false).await;

  for (who, when) in [(percy, date(2005, 6, 1)), (percy, date(2006, 6, 1)), (other, date(2007, 1, 1))] {
    s.record_encounter(NewEncounter {
      hero_id:        who,
      creature_id:    minotaur,
      encounter_date: when,
      location:       "Half-Blood Hill".into(),
      outcome:        "Survived".into(),
    })
    .await
    .unwrap();
  }

  let rows = s.hero_encounters(percy).await.into_result().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].encounter_date, date(2006, 6, 1));
  assert_eq!(rows[0].species, "Minotaur");
}

#[tokio::test]
async fn lookups_are_ordered_for_selection() {
  let s = store().await;
  deity(&s, "Zeus").await;
  deity(&s, "Athena").await;
  hero(&s, "Percy", "Jackson", None).await;
  hero(&s, "Annabeth", "Chase", None).await;
  creature(&s, "Sphinx", 5, false).await;
  let first = quest(&s, "First", date(2005, 1, 1)).await;
  let second = quest(&s, "Second", date(2006, 1, 1)).await;

  let deities = s.all_deities().await.value;
  assert_eq!(deities[0].label, "Athena");
  let heroes = s.all_heroes().await.value;
  assert_eq!(heroes[0].label, "Annabeth Chase");
  assert_eq!(s.all_creatures().await.value[0].label, "Sphinx");
  assert!(s.all_artifacts().await.value.is_empty());
  let quests: Vec<_> = s.all_quests().await.value.iter().map(|l| l.id).collect();
  assert_eq!(quests, [second, first]);
}
