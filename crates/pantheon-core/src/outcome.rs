//! Boundary types: what every operation resolves into.
//!
//! Mutations return an [`Outcome`]: the payload on success, or a [`Failure`]
//! carrying a human-readable reason. Queries return a [`Report`]: on failure
//! the value falls back to its default (an empty row set, a zeroed aggregate)
//! and the error text is surfaced beside it. Neither carries a live error
//! value, so both can cross any boundary (threads, JSON, a UI layer).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category of a mutation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  /// A precondition did not hold (missing parent, prophecy already linked).
  Precondition,
  /// The row the caller meant to change does not exist.
  NotFound,
  /// The storage engine rejected the operation or could not be reached.
  Storage,
}

/// A mutation that did not happen. Nothing it issued was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
  pub kind:    FailureKind,
  pub message: String,
}

impl Failure {
  pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  pub fn storage(message: impl Into<String>) -> Self {
    Self::new(FailureKind::Storage, message)
  }
}

impl fmt::Display for Failure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

impl std::error::Error for Failure {}

impl From<crate::Error> for Failure {
  fn from(e: crate::Error) -> Self {
    let kind = if e.is_not_found() {
      FailureKind::NotFound
    } else {
      FailureKind::Precondition
    };
    Self::new(kind, e.to_string())
  }
}

/// Result of a mutation.
pub type Outcome<T> = Result<T, Failure>;

/// Result of a query: always a value, plus the error that emptied it, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report<T> {
  pub value: T,
  pub error: Option<String>,
}

impl<T> Report<T> {
  pub fn ok(value: T) -> Self { Self { value, error: None } }

  pub fn is_ok(&self) -> bool { self.error.is_none() }

  /// Convert back into a `Result`, discarding the fallback value on error.
  pub fn into_result(self) -> Result<T, String> {
    match self.error {
      None => Ok(self.value),
      Some(e) => Err(e),
    }
  }
}

impl<T: Default> Report<T> {
  /// The fallback report for a failed query.
  pub fn failed(error: impl Into<String>) -> Self {
    Self { value: T::default(), error: Some(error.into()) }
  }
}

impl<T: Default, E: fmt::Display> From<Result<T, E>> for Report<T> {
  fn from(result: Result<T, E>) -> Self {
    match result {
      Ok(value) => Self::ok(value),
      Err(e) => Self::failed(e.to_string()),
    }
  }
}
