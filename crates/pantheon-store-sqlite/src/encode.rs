//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`. Sighting timestamps are stored
//! as RFC 3339 strings in UTC with exactly six fractional digits, so that the
//! text form is a stable key. Status enumerations are stored by their
//! display name (`"Active"`, `"Hero Victory"`).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::{Row, types::Type};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The current time, truncated to the precision the store keeps.
pub fn now_timestamp() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_enum<E: Into<&'static str>>(value: E) -> &'static str { value.into() }

// ─── Column decoding ─────────────────────────────────────────────────────────

/// Read a text column and parse it with `FromStr`.
///
/// Parse failures surface as `FromSqlConversionFailure` so they travel through
/// `query_map` like any other column error.
pub fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let text: String = row.get(idx)?;
  parse_text(&text, idx)
}

/// Like [`parsed`], for a nullable column.
pub fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let text: Option<String> = row.get(idx)?;
  text.map(|t| parse_text(&t, idx)).transpose()
}

fn parse_text<T>(text: &str, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  text
    .parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
