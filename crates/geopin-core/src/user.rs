//! User: the identity that owns points and writes messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
}

/// A user together with the stored argon2 PHC string for their password.
///
/// Only returned by credential lookups; never serialised.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}
