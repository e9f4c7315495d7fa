//! Error types for `geopin-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("point not found: {0}")]
  PointNotFound(Uuid),

  #[error("username already taken: {0}")]
  UsernameTaken(String),

  #[error("message text may not be blank")]
  BlankText,

  #[error("point title may not be blank")]
  BlankTitle,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so callers holding only a generic
/// `S::Error` can still tell domain failures apart from infrastructure ones.
pub trait DomainError {
  /// The domain error wrapped by `self`, if any.
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}
