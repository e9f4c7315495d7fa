//! [`SqliteStore`], the SQLite implementation of [`GeoStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use geopin_core::{
  geo::{Coordinate, SRID_WGS84, SearchArea, geodesic_distance_m},
  message::{Message, NewMessage},
  point::{NewPoint, Point},
  store::GeoStore,
  user::{Credentials, User},
};

use crate::{
  Result,
  encode::{RawMessage, RawPoint, RawUser, encode_dt, encode_uuid, now},
  schema::SCHEMA,
};

/// Name of the SQL scalar function computing great-circle distance in metres:
/// `geodesic_distance_m(lon1, lat1, lon2, lat2)`.
const DISTANCE_FN: &str = "geodesic_distance_m";

/// Map a failed `CHECK` constraint to `domain`; other errors pass through.
fn check_violation(e: tokio_rusqlite::Error, domain: geopin_core::Error) -> crate::Error {
  let failed_check = matches!(
    &e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK
  );
  if failed_check { domain.into() } else { e.into() }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A geopin store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = ?path.as_ref(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.create_scalar_function(
          DISTANCE_FN,
          4,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| {
            let a = Coordinate::new(ctx.get::<f64>(0)?, ctx.get::<f64>(1)?);
            let b = Coordinate::new(ctx.get::<f64>(2)?, ctx.get::<f64>(3)?);
            Ok(geodesic_distance_m(a, b))
          },
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Query parameters shared by both radius searches:
  /// `(lat_min, lat_max, center_lon, center_lat, radius_m)`.
  fn radius_params(center: Coordinate, radius_km: f64) -> (f64, f64, f64, f64, f64) {
    let area = SearchArea { center, radius_km };
    let radius_m = area.radius_m();
    let (lat_min, lat_max) = center.latitude_band(radius_m);
    (lat_min, lat_max, center.longitude, center.latitude, radius_m)
  }
}

// ─── GeoStore impl ───────────────────────────────────────────────────────────

impl GeoStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, username: String, password_hash: String) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      username:   username.clone(),
      created_at: now(),
    };

    let id_str = encode_uuid(user.user_id);
    let at_str = encode_dt(user.created_at);
    let name   = username.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, password_hash, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(geopin_core::Error::UsernameTaken(username).into());
    }
    Ok(user)
  }

  async fn find_credentials(&self, username: String) -> Result<Option<Credentials>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, password_hash, created_at
             FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawUser {
                user_id:       row.get(0)?,
                username:      row.get(1)?,
                password_hash: row.get(2)?,
                created_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  async fn delete_user(&self, username: String) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE username = ?1",
          rusqlite::params![username],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Points ────────────────────────────────────────────────────────────────

  async fn create_point(&self, input: NewPoint) -> Result<Point> {
    let title = input.title.trim().to_owned();
    if title.is_empty() {
      return Err(geopin_core::Error::BlankTitle.into());
    }

    let point = Point {
      point_id:   Uuid::new_v4(),
      owner:      input.owner,
      title,
      location:   input.location,
      created_at: now(),
    };

    let id_str    = encode_uuid(point.point_id);
    let owner_str = encode_uuid(point.owner);
    let title     = point.title.clone();
    let lon       = point.location.longitude;
    let lat       = point.location.latitude;
    let at_str    = encode_dt(point.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO points (point_id, owner_id, title, longitude, latitude, srid, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, owner_str, title, lon, lat, SRID_WGS84, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| check_violation(e, geopin_core::Error::BlankTitle))?;

    Ok(point)
  }

  async fn get_point(&self, id: Uuid) -> Result<Option<Point>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPoint> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT point_id, owner_id, title, longitude, latitude, created_at
             FROM points WHERE point_id = ?1",
            rusqlite::params![id_str],
            RawPoint::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPoint::into_point).transpose()
  }

  async fn points_within(&self, center: Coordinate, radius_km: f64) -> Result<Vec<Point>> {
    let (lat_min, lat_max, lon, lat, radius_m) = Self::radius_params(center, radius_km);

    let raws: Vec<RawPoint> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT point_id, owner_id, title, longitude, latitude, created_at
           FROM points
           WHERE latitude BETWEEN ?1 AND ?2
             AND geodesic_distance_m(longitude, latitude, ?3, ?4) <= ?5
           ORDER BY created_at DESC, point_id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![lat_min, lat_max, lon, lat, radius_m],
            RawPoint::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPoint::into_point).collect()
  }

  async fn delete_point(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM points WHERE point_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn create_message(&self, input: NewMessage) -> Result<Message> {
    let text = input.text.trim().to_owned();
    if text.is_empty() {
      return Err(geopin_core::Error::BlankText.into());
    }

    let message = Message {
      message_id: Uuid::new_v4(),
      point_id:   input.point_id,
      author:     input.author,
      text,
      created_at: now(),
    };

    let id_str     = encode_uuid(message.message_id);
    let point_str  = encode_uuid(message.point_id);
    let author_str = encode_uuid(message.author);
    let text       = message.text.clone();
    let at_str     = encode_dt(message.created_at);

    // The existence check and the insert share a transaction so the point
    // cannot disappear in between.
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM points WHERE point_id = ?1",
            rusqlite::params![point_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO messages (message_id, point_id, author_id, text, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, point_str, author_str, text, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(|e| check_violation(e, geopin_core::Error::BlankText))?;

    if !inserted {
      return Err(geopin_core::Error::PointNotFound(message.point_id).into());
    }
    Ok(message)
  }

  async fn messages_within(&self, center: Coordinate, radius_km: f64) -> Result<Vec<Message>> {
    let (lat_min, lat_max, lon, lat, radius_m) = Self::radius_params(center, radius_km);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT m.message_id, m.point_id, m.author_id, m.text, m.created_at
           FROM messages m
           JOIN points p ON p.point_id = m.point_id
           WHERE p.latitude BETWEEN ?1 AND ?2
             AND geodesic_distance_m(p.longitude, p.latitude, ?3, ?4) <= ?5
           ORDER BY m.created_at DESC, m.message_id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![lat_min, lat_max, lon, lat, radius_m],
            RawMessage::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }
}
