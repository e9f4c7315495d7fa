//! HTTP Basic-auth identity extractor and password hashing.
//!
//! Credentials are checked against the store's `users` table; passwords are
//! kept as argon2 PHC strings.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use geopin_core::{store::GeoStore, user::Credentials};
use rand_core::OsRng;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const INVALID_CREDENTIALS: &str = "Invalid username/password.";

/// The authenticated user behind the current request.
///
/// Present in a handler means the request was authenticated; records are
/// attributed to `user_id`, never to anything the client sent.
#[derive(Debug, Clone)]
pub struct Identity {
  pub user_id:  Uuid,
  pub username: String,
}

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Extract `(username, password)` from a `Basic` authorization header.
///
/// `Ok(None)` means no credentials were sent at all.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };
  let invalid = || ApiError::Forbidden(INVALID_CREDENTIALS);

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or_else(invalid)?;
  let decoded = B64.decode(encoded.trim()).map_err(|_| invalid())?;
  let creds = String::from_utf8(decoded).map_err(|_| invalid())?;
  let (username, password) = creds.split_once(':').ok_or_else(invalid)?;

  Ok(Some((username.to_owned(), password.to_owned())))
}

/// Resolve the request's credentials to an [`Identity`].
pub async fn authenticate<S: GeoStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Identity, ApiError> {
  let (username, password) =
    basic_credentials(headers)?.ok_or(ApiError::Forbidden(NOT_AUTHENTICATED))?;

  let creds = store
    .find_credentials(username)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Forbidden(INVALID_CREDENTIALS))?;

  let Credentials { user, password_hash } = creds;

  // argon2 is CPU-bound; verify on the blocking pool.
  let matches =
    tokio::task::spawn_blocking(move || password_matches(&password, &password_hash))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !matches {
    return Err(ApiError::Forbidden(INVALID_CREDENTIALS));
  }

  Ok(Identity {
    user_id:  user.user_id,
    username: user.username,
  })
}

/// Check `password` against an argon2 PHC string. A malformed hash never
/// matches.
fn password_matches(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|hash| {
    Argon2::default()
      .verify_password(password.as_bytes(), &hash)
      .is_ok()
  })
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
  S: GeoStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = authenticate(&parts.headers, state.store.as_ref()).await;
    if let Err(e) = &identity {
      tracing::debug!(error = %e, uri = %parts.uri, "authentication failed");
    }
    identity
  }
}
