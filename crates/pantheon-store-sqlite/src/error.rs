//! Error type for `pantheon-store-sqlite`.

use pantheon_core::Failure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] pantheon_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),
}

impl Error {
  /// Whether this error is a domain precondition rather than a storage fault.
  pub fn is_domain(&self) -> bool { matches!(self, Self::Core(_)) }
}

impl From<Error> for Failure {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => Failure::from(core),
      other => Failure::storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
