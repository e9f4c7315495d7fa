//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond
//! precision, so lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings. Coordinates are two `REAL` columns.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use geopin_core::{
  geo::Coordinate,
  message::Message,
  point::Point,
  user::{Credentials, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Truncate to the precision the store keeps, so a freshly created record
/// compares equal to the same record read back.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        username:   self.username,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

/// Raw values read directly from a `points` row.
pub struct RawPoint {
  pub point_id:   String,
  pub owner_id:   String,
  pub title:      String,
  pub longitude:  f64,
  pub latitude:   f64,
  pub created_at: String,
}

impl RawPoint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      point_id:   row.get(0)?,
      owner_id:   row.get(1)?,
      title:      row.get(2)?,
      longitude:  row.get(3)?,
      latitude:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_point(self) -> Result<Point> {
    Ok(Point {
      point_id:   decode_uuid(&self.point_id)?,
      owner:      decode_uuid(&self.owner_id)?,
      title:      self.title,
      location:   Coordinate::new(self.longitude, self.latitude),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `messages` row.
pub struct RawMessage {
  pub message_id: String,
  pub point_id:   String,
  pub author_id:  String,
  pub text:       String,
  pub created_at: String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      point_id:   row.get(1)?,
      author_id:  row.get(2)?,
      text:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id: decode_uuid(&self.message_id)?,
      point_id:   decode_uuid(&self.point_id)?,
      author:     decode_uuid(&self.author_id)?,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
