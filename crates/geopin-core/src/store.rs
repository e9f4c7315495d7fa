//! The `GeoStore` trait.
//!
//! Implemented by storage backends (e.g. `geopin-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  DomainError,
  geo::Coordinate,
  message::{Message, NewMessage},
  point::{NewPoint, Point},
  user::{Credentials, User},
};

/// Abstraction over a geopin backend.
///
/// Distance filtering happens inside the backend's query. Every method
/// returns a `Send` future so the trait can be used from axum handlers on a
/// multi-threaded runtime.
pub trait GeoStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Fails with [`crate::Error::UsernameTaken`] on a
  /// duplicate username.
  fn add_user(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by username.
  fn find_credentials(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  /// Delete a user, cascading to their points and messages. Returns `false`
  /// if no such user existed.
  fn delete_user(
    &self,
    username: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Points ────────────────────────────────────────────────────────────

  /// Persist a new point. Fails with [`crate::Error::BlankTitle`] if the
  /// title is empty after trimming.
  fn create_point(
    &self,
    input: NewPoint,
  ) -> impl Future<Output = Result<Point, Self::Error>> + Send + '_;

  /// Retrieve a point by id. Returns `None` if not found.
  fn get_point(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Point>, Self::Error>> + Send + '_;

  /// Every point within `radius_km` (geodesic) of `center`, newest first.
  fn points_within(
    &self,
    center: Coordinate,
    radius_km: f64,
  ) -> impl Future<Output = Result<Vec<Point>, Self::Error>> + Send + '_;

  /// Delete a point and its messages. Returns `false` if it did not exist.
  fn delete_point(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Persist a new message.
  ///
  /// Fails with [`crate::Error::PointNotFound`] if `input.point_id` does not
  /// exist and [`crate::Error::BlankText`] if the text is blank.
  fn create_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Every message whose point lies within `radius_km` of `center`, newest
  /// first.
  fn messages_within(
    &self,
    center: Coordinate,
    radius_km: f64,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;
}
