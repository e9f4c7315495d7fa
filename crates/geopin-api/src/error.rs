//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use geopin_core::{DomainError, validate::FieldErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or rejected credentials. Reported as 403, before anything else
  /// about the request is looked at.
  #[error("{0}")]
  Forbidden(&'static str),

  #[error("method \"{method}\" not allowed")]
  MethodNotAllowed { method: Method, allow: Method },

  /// Malformed request body.
  #[error("{0}")]
  BadRequest(String),

  /// Field-level validation failures.
  #[error("validation failed")]
  Validation(FieldErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store error, turning domain failures into field errors on the
  /// request field that caused them.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    use geopin_core::Error as D;

    let field = match e.domain() {
      Some(D::PointNotFound(id)) => Some((
        "point_id",
        format!("Invalid pk \"{id}\" - object does not exist."),
      )),
      Some(D::BlankText) => {
        Some(("text", geopin_core::validate::NOT_BLANK.to_owned()))
      }
      Some(D::BlankTitle) => {
        Some(("title", geopin_core::validate::NOT_BLANK.to_owned()))
      }
      _ => None,
    };

    match field {
      Some((field, message)) => {
        ApiError::Validation(FieldErrors::single(field, message))
      }
      None => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<FieldErrors> for ApiError {
  fn from(errors: FieldErrors) -> Self { ApiError::Validation(errors) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Forbidden(m) => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": m }))).into_response()
      }
      ApiError::MethodNotAllowed { method, allow } => {
        let body = json!({ "error": format!("Method \"{method}\" not allowed.") });
        let mut res = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
        if let Ok(v) = HeaderValue::from_str(allow.as_str()) {
          res.headers_mut().insert(header::ALLOW, v);
        }
        res
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(fields) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "validation failed", "fields": fields })),
      )
        .into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": e.to_string() })),
        )
          .into_response()
      }
    }
  }
}
