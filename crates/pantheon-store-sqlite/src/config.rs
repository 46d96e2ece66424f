//! Store configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Options for opening a [`SqliteStore`](crate::SqliteStore).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Path to the SQLite database file; created if missing.
  pub path:             PathBuf,
  /// Reject artifact wielders that name no existing hero.
  ///
  /// When off, any identifier is accepted, including dangling ones.
  #[serde(default = "default_validate_wielder")]
  pub validate_wielder: bool,
}

fn default_validate_wielder() -> bool { true }

impl StoreConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), validate_wielder: true }
  }
}
