//! Point: a named location owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// A persisted point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub point_id:   Uuid,
  /// The user who created the point.
  pub owner:      Uuid,
  pub title:      String,
  pub location:   Coordinate,
  pub created_at: DateTime<Utc>,
}

/// Input to [`GeoStore::create_point`](crate::store::GeoStore::create_point).
/// `point_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPoint {
  pub owner:    Uuid,
  pub title:    String,
  pub location: Coordinate,
}
