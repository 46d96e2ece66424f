//! Domain error types for `pantheon-core`.
//!
//! Every variant is a precondition or not-found condition discovered while a
//! mutation runs. Storage-level failures live in the backend crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ArtifactId, CreatureId, DeityId, HeroId, ProphecyId, QuestId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("parent not found: no deity with id {0}")]
  ParentNotFound(DeityId),

  #[error("prophecy already linked: prophecy {prophecy_id} is foretold by quest {quest_id}")]
  ProphecyAlreadyLinked {
    prophecy_id: ProphecyId,
    quest_id:    QuestId,
  },

  #[error("wielder not found: no hero with id {0}")]
  WielderNotFound(HeroId),

  #[error("hero not found: {0}")]
  HeroNotFound(HeroId),

  #[error("quest not found: {0}")]
  QuestNotFound(QuestId),

  #[error("artifact not found: {0}")]
  ArtifactNotFound(ArtifactId),

  #[error("sighting not found: creature {creature_id} at {sighted_at}")]
  SightingNotFound {
    creature_id: CreatureId,
    sighted_at:  DateTime<Utc>,
  },

  #[error("ability not found: hero {hero_id} has no ability {ability:?}")]
  AbilityNotFound { hero_id: HeroId, ability: String },

  #[error("hero {hero_id} already participates in quest {quest_id}")]
  AlreadyEnlisted { hero_id: HeroId, quest_id: QuestId },
}

impl Error {
  /// `true` for the variants that report an absent target row.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::HeroNotFound(_)
        | Self::QuestNotFound(_)
        | Self::ArtifactNotFound(_)
        | Self::SightingNotFound { .. }
        | Self::AbilityNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
