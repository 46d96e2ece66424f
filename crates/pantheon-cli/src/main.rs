//! `pantheon`: command-line front end for the Pantheon knowledge base.
//!
//! Opens the SQLite store named by the configuration, runs a single query or
//! mutation, and prints its result as JSON on stdout.
//!
//! # Usage
//!
//! ```
//! pantheon --db camp.db query heroes-by-parent Poseidon
//! pantheon list quests
//! pantheon create hero '{"first_name": "Percy", ...}'
//! pantheon set-status 3 Deceased
//! ```

use std::{
  io::Read as _,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use pantheon_core::{
  Outcome, Report,
  model::{
    ArtifactId, CreatureId, HeroId, HeroStatus, QuestId, QuestOutcome,
  },
  service::{MutationService, QueryService},
};
use pantheon_store_sqlite::{SqliteStore, StoreConfig};
use serde::{Serialize, de::DeserializeOwned};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Pantheon knowledge base")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pantheon.toml")]
  config: PathBuf,

  /// Database file; overrides `path` from the configuration.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  /// Accept artifact wielders that name no existing hero.
  #[arg(long)]
  no_validate_wielder: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run a read-only report.
  #[command(subcommand)]
  Query(QueryCommand),

  /// List identifiers and labels for selection.
  #[command(subcommand)]
  List(ListCommand),

  /// Create an entity from a JSON document (`-` reads stdin).
  #[command(subcommand)]
  Create(CreateCommand),

  /// Set a hero's status; `Deceased` closes their ongoing quests.
  SetStatus { hero_id: HeroId, status: HeroStatus },

  /// Set a quest's outcome, optionally recording its end date.
  SetOutcome {
    quest_id: QuestId,
    outcome:  QuestOutcome,
    #[arg(long, value_name = "YYYY-MM-DD")]
    end_date: Option<NaiveDate>,
  },

  /// Hand an artifact to a hero, or un-wield it when `--hero` is omitted.
  Wield {
    artifact_id: ArtifactId,
    #[arg(long)]
    hero:        Option<HeroId>,
  },

  /// Log a creature sighting at the current time.
  Sight {
    creature_id: CreatureId,
    location:    String,
    #[arg(long)]
    reporter:    HeroId,
  },

  /// Delete one sighting by creature and timestamp.
  Unsight {
    creature_id: CreatureId,
    sighted_at:  DateTime<Utc>,
  },

  /// Enlist a hero in a quest.
  Enlist {
    hero_id:  HeroId,
    quest_id: QuestId,
    #[arg(long, default_value = "Member")]
    role:     String,
  },

  /// Delete a quest and its participations.
  DeleteQuest { quest_id: QuestId },

  /// Remove one ability from a hero.
  ForgetAbility { hero_id: HeroId, ability: String },
}

#[derive(Subcommand, Debug)]
enum QueryCommand {
  /// Heroes whose divine parent has the given name.
  HeroesByParent { deity: String },
  /// Quests with their prophecy, optionally filtered by outcome.
  Quests {
    #[arg(long)]
    outcome: Option<QuestOutcome>,
  },
  /// Artifacts with wielder and properties.
  Artifacts,
  /// Creatures at or above a threat level.
  DangerousCreatures {
    #[arg(long, default_value_t = 7)]
    min_threat: i64,
  },
  /// Unsettled prophecies no quest follows.
  OpenProphecies,
  /// Every hero's name and divine parent.
  Heroes,
  /// Threat statistics over Titans.
  TitanStats,
  /// Artifacts whose name or description contains a term.
  SearchArtifacts { term: String },
  /// Quest activity grouped by divine parent.
  DivineParents,
  /// Row counts across the knowledge base.
  Stats,
  /// A hero's creature encounters, newest first.
  Encounters { hero_id: HeroId },
  /// Heroes enlisted in a quest.
  Participants { quest_id: QuestId },
  /// Council seat holders.
  Council,
  /// Combat success rate per hero, artifact and species.
  SuccessRates {
    #[arg(long)]
    species: Option<String>,
  },
  /// Creatures fought on prophesied quests.
  ProphecyCreatures,
  /// Latest creature sightings.
  Sightings {
    #[arg(long, default_value_t = 20)]
    limit: u32,
  },
  /// A hero's abilities.
  Abilities { hero_id: HeroId },
}

#[derive(Subcommand, Debug)]
enum ListCommand {
  Deities,
  Heroes,
  Creatures,
  Artifacts,
  Quests,
  /// Prophecies not yet followed by a quest.
  Prophecies,
}

#[derive(Subcommand, Debug)]
enum CreateCommand {
  Deity { input: String },
  Hero { input: String },
  Creature { input: String },
  Artifact { input: String },
  Prophecy { input: String },
  Quest { input: String },
  Encounter { input: String },
  Combat { input: String },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = load_config(&cli)?;

  let store = SqliteStore::open(&config)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.path))?;
  tracing::info!(path = ?config.path, "store opened");

  match cli.command {
    Command::Query(query) => run_query(&store, query).await,
    Command::List(list) => run_list(&store, list).await,
    Command::Create(create) => run_create(&store, create).await,
    Command::SetStatus { hero_id, status } => {
      emit_outcome(store.set_hero_status(hero_id, status).await)
    }
    Command::SetOutcome { quest_id, outcome, end_date } => {
      emit_outcome(store.set_quest_outcome(quest_id, outcome, end_date).await)
    }
    Command::Wield { artifact_id, hero } => {
      emit_outcome(store.set_artifact_wielder(artifact_id, hero).await)
    }
    Command::Sight { creature_id, location, reporter } => {
      emit_outcome(store.record_sighting(creature_id, &location, reporter).await)
    }
    Command::Unsight { creature_id, sighted_at } => {
      emit_outcome(store.delete_sighting(creature_id, sighted_at).await)
    }
    Command::Enlist { hero_id, quest_id, role } => {
      emit_outcome(store.enlist_hero(hero_id, quest_id, &role).await)
    }
    Command::DeleteQuest { quest_id } => {
      let deletion = store.delete_quest(quest_id).await?;
      eprintln!("{deletion}");
      emit(&deletion)
    }
    Command::ForgetAbility { hero_id, ability } => {
      emit_outcome(store.remove_hero_ability(hero_id, &ability).await)
    }
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Defaults, then the TOML file, then `PANTHEON_*` variables, then flags.
fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
  let mut builder = config::Config::builder()
    .set_default("path", "pantheon.db")?
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("PANTHEON"))
    .set_override_option(
      "path",
      cli.db.as_ref().map(|p| p.to_string_lossy().into_owned()),
    )?;
  if cli.no_validate_wielder {
    builder = builder.set_override("validate_wielder", false)?;
  }

  let mut store_cfg: StoreConfig = builder
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;

  store_cfg.path = expand_tilde(&store_cfg.path);
  Ok(store_cfg)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

async fn run_query(store: &SqliteStore, query: QueryCommand) -> anyhow::Result<()> {
  match query {
    QueryCommand::HeroesByParent { deity } => emit_report(store.heroes_by_parent(&deity).await),
    QueryCommand::Quests { outcome } => emit_report(store.quests_with_details(outcome).await),
    QueryCommand::Artifacts => emit_report(store.artifacts_and_wielders().await),
    QueryCommand::DangerousCreatures { min_threat } => {
      emit_report(store.dangerous_creatures(min_threat).await)
    }
    QueryCommand::OpenProphecies => {
      emit_report(store.active_prophecies_without_quest().await)
    }
    QueryCommand::Heroes => emit_report(store.hero_projection().await),
    QueryCommand::TitanStats => emit_report(store.titan_threat_statistics().await),
    QueryCommand::SearchArtifacts { term } => emit_report(store.search_artifacts(&term).await),
    QueryCommand::DivineParents => emit_report(store.quests_by_divine_parent().await),
    QueryCommand::Stats => emit_report(store.database_statistics().await),
    QueryCommand::Encounters { hero_id } => emit_report(store.hero_encounters(hero_id).await),
    QueryCommand::Participants { quest_id } => {
      emit_report(store.quest_participants(quest_id).await)
    }
    QueryCommand::Council => emit_report(store.olympian_council().await),
    QueryCommand::SuccessRates { species } => {
      emit_report(store.artifact_success_rates(species.as_deref()).await)
    }
    QueryCommand::ProphecyCreatures => {
      emit_report(store.prophecy_creature_correlation().await)
    }
    QueryCommand::Sightings { limit } => emit_report(store.recent_sightings(limit).await),
    QueryCommand::Abilities { hero_id } => emit_report(store.hero_abilities(hero_id).await),
  }
}

async fn run_list(store: &SqliteStore, list: ListCommand) -> anyhow::Result<()> {
  let report = match list {
    ListCommand::Deities => store.all_deities().await,
    ListCommand::Heroes => store.all_heroes().await,
    ListCommand::Creatures => store.all_creatures().await,
    ListCommand::Artifacts => store.all_artifacts().await,
    ListCommand::Quests => store.all_quests().await,
    ListCommand::Prophecies => store.available_prophecies().await,
  };
  emit_report(report)
}

async fn run_create(store: &SqliteStore, create: CreateCommand) -> anyhow::Result<()> {
  let id = match create {
    CreateCommand::Deity { input } => store.create_deity(parse_input(&input)?).await,
    CreateCommand::Hero { input } => store.create_hero(parse_input(&input)?).await,
    CreateCommand::Creature { input } => store.create_creature(parse_input(&input)?).await,
    CreateCommand::Artifact { input } => store.create_artifact(parse_input(&input)?).await,
    CreateCommand::Prophecy { input } => store.create_prophecy(parse_input(&input)?).await,
    CreateCommand::Quest { input } => store.create_quest(parse_input(&input)?).await,
    CreateCommand::Encounter { input } => store.record_encounter(parse_input(&input)?).await,
    CreateCommand::Combat { input } => store.record_combat(parse_input(&input)?).await,
  };
  emit_outcome(id)
}

// ─── Input & output ──────────────────────────────────────────────────────────

/// Deserialise a create input given inline, or read from stdin for `-`.
fn parse_input<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
  if raw == "-" {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("failed to read input from stdin")?;
    return serde_json::from_str(&buf).context("invalid JSON input");
  }
  serde_json::from_str(raw).context("invalid JSON input")
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Reports are printed whole, error included; a failed query still exits 0
/// with its empty value.
fn emit_report<T: Serialize>(report: Report<T>) -> anyhow::Result<()> {
  if let Some(error) = &report.error {
    tracing::warn!(%error, "query returned no data");
  }
  emit(&report)
}

fn emit_outcome<T: Serialize>(outcome: Outcome<T>) -> anyhow::Result<()> {
  let value = outcome?;
  emit(&value)
}
