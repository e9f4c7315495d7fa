//! Generic create and search handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/points/` | Body: `{"title", "latitude", "longitude"}`; 201 + point |
//! | `GET`  | `/api/points/search/` | `?latitude&longitude&radius` (km) |
//! | `POST` | `/api/points/messages/` | Body: `{"point_id", "text"}`; 201 + message |
//! | `GET`  | `/api/points/messages/search/` | `?latitude&longitude&radius` (km) |
//!
//! Both handlers are mounted with `any` so the check order is fixed:
//! authentication first (403), then the method (405), then the payload (400).

use std::collections::HashMap;

use axum::{
  Json,
  extract::{Query, State},
  http::{Method, StatusCode},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use geopin_core::{store::GeoStore, validate};
use serde_json::{Map, Value};

use crate::{AppState, auth::Identity, error::ApiError, resource::GeoResource};

fn require_method(method: &Method, allow: Method) -> Result<(), ApiError> {
  if *method == allow {
    Ok(())
  } else {
    Err(ApiError::MethodNotAllowed { method: method.clone(), allow })
  }
}

/// Parse a JSON object body. An empty body reads as `{}`, so missing fields
/// are reported individually rather than as a parse error.
fn json_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(Map::new());
  }
  match serde_json::from_slice::<Value>(body) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(ApiError::BadRequest(format!(
      "Invalid data. Expected an object, but got {}.",
      json_type(&other)
    ))),
    Err(e) => Err(ApiError::BadRequest(format!("JSON parse error - {e}"))),
  }
}

fn json_type(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "list",
    Value::Object(_) => "object",
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST`: validate the body, attribute it to the requester, persist it and
/// return 201 with the stored record.
pub async fn create<S, R>(
  State(state): State<AppState<S>>,
  identity: Identity,
  method: Method,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: GeoStore + 'static,
  R: GeoResource<S>,
{
  require_method(&method, Method::POST)?;

  let fields = json_object(&body)?;
  let draft = R::parse_draft(&fields)?;
  let new = R::attribute(draft, identity.user_id);

  let record = R::insert(state.store.as_ref(), new)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(user = %identity.username, "record created");
  Ok((StatusCode::CREATED, Json(record)).into_response())
}

// ─── Search ───────────────────────────────────────────────────────────────────

/// `GET ?latitude=..&longitude=..&radius=..`: every record within `radius`
/// kilometres of the centre.
pub async fn search<S, R>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  method: Method,
  Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError>
where
  S: GeoStore + 'static,
  R: GeoResource<S>,
{
  require_method(&method, Method::GET)?;

  let fields: Map<String, Value> = params
    .into_iter()
    .map(|(k, v)| (k, Value::String(v)))
    .collect();
  let area = validate::search_area(&fields)?;

  let records = R::within_radius(state.store.as_ref(), area)
    .await
    .map_err(ApiError::from_store)?;

  tracing::debug!(
    lat = area.center.latitude,
    lon = area.center.longitude,
    radius_km = area.radius_km,
    hits = records.len(),
    "radius search"
  );
  Ok(Json(records).into_response())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_body_reads_as_empty_object() {
    assert!(json_object(b"").unwrap().is_empty());
    assert!(json_object(b" \n").unwrap().is_empty());
  }

  #[test]
  fn non_object_bodies_are_bad_requests() {
    assert!(matches!(json_object(b"[1, 2]"), Err(ApiError::BadRequest(m)) if m.contains("list")));
    assert!(matches!(json_object(b"{oops"), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn only_the_allowed_method_passes() {
    assert!(require_method(&Method::POST, Method::POST).is_ok());
    assert!(matches!(
      require_method(&Method::PUT, Method::POST),
      Err(ApiError::MethodNotAllowed { allow, .. }) if allow == Method::POST
    ));
  }
}
