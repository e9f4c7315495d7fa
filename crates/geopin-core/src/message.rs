//! Message: a text note pinned to exactly one point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub message_id: Uuid,
  pub point_id:   Uuid,
  /// The user who wrote the message; always the authenticated requester.
  pub author:     Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`GeoStore::create_message`](crate::store::GeoStore::create_message).
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub point_id: Uuid,
  pub author:   Uuid,
  pub text:     String,
}
