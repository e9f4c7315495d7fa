//! Field-level validation shared by the create and search endpoints.
//!
//! Inputs arrive as loosely-typed JSON values (query strings are lifted to
//! [`Value::String`]). Each `*_field` helper either returns the parsed value
//! or records a message against the field in a [`FieldErrors`] map; callers
//! validate every field before deciding, so all problems are reported at once.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::geo::{Coordinate, SearchArea};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const NULL_CHARACTER: &str = "Null characters are not allowed.";
pub const INVALID_UUID: &str = "Must be a valid UUID.";
pub const LATITUDE_RANGE: &str = "Must be in the range [-90; 90].";
pub const LONGITUDE_RANGE: &str = "Must be in the range [-180; 180].";
pub const RADIUS_POSITIVE: &str = "Radius must be greater than 0.";

/// Maximum length of a point title, in characters.
pub const TITLE_MAX_LENGTH: usize = 255;

// ─── Error map ───────────────────────────────────────────────────────────────

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  /// A map holding exactly one message.
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.push(field, message);
    errors
  }

  pub fn push(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_owned()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Messages recorded against `field`, if any.
  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

// ─── Primitive fields ────────────────────────────────────────────────────────

/// Parse a finite float from a JSON number or numeric string.
pub fn float_field(
  errors: &mut FieldErrors,
  field: &str,
  value: Option<&Value>,
) -> Option<f64> {
  let parsed = match value {
    None => {
      errors.push(field, REQUIRED);
      return None;
    }
    Some(Value::Null) => {
      errors.push(field, NOT_NULL);
      return None;
    }
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
    Some(_) => None,
  };

  match parsed.filter(|f| f.is_finite()) {
    Some(f) => Some(f),
    None => {
      errors.push(field, INVALID_NUMBER);
      None
    }
  }
}

/// Parse a trimmed, non-blank string, optionally bounded in length.
///
/// Numbers are accepted and rendered as strings; other JSON types are not.
/// NUL characters are rejected.
pub fn char_field(
  errors: &mut FieldErrors,
  field: &str,
  value: Option<&Value>,
  max_length: Option<usize>,
) -> Option<String> {
  let raw = match value {
    None => {
      errors.push(field, REQUIRED);
      return None;
    }
    Some(Value::Null) => {
      errors.push(field, NOT_NULL);
      return None;
    }
    Some(Value::String(s)) => s.trim().to_owned(),
    Some(Value::Number(n)) => n.to_string(),
    Some(_) => {
      errors.push(field, INVALID_STRING);
      return None;
    }
  };

  if raw.contains('\0') {
    errors.push(field, NULL_CHARACTER);
    return None;
  }
  if raw.is_empty() {
    errors.push(field, NOT_BLANK);
    return None;
  }
  if let Some(max) = max_length
    && raw.chars().count() > max
  {
    errors.push(
      field,
      format!("Ensure this field has no more than {max} characters."),
    );
    return None;
  }
  Some(raw)
}

/// Parse a UUID given as a string.
pub fn uuid_field(
  errors: &mut FieldErrors,
  field: &str,
  value: Option<&Value>,
) -> Option<Uuid> {
  match value {
    None => {
      errors.push(field, REQUIRED);
      None
    }
    Some(Value::Null) => {
      errors.push(field, NOT_NULL);
      None
    }
    Some(Value::String(s)) => match Uuid::parse_str(s.trim()) {
      Ok(id) => Some(id),
      Err(_) => {
        errors.push(field, INVALID_UUID);
        None
      }
    },
    Some(_) => {
      errors.push(field, INVALID_UUID);
      None
    }
  }
}

// ─── Geo validation ──────────────────────────────────────────────────────────

pub fn latitude_field(
  errors: &mut FieldErrors,
  value: Option<&Value>,
) -> Option<f64> {
  let lat = float_field(errors, "latitude", value)?;
  if !(-90.0..=90.0).contains(&lat) {
    errors.push("latitude", LATITUDE_RANGE);
    return None;
  }
  Some(lat)
}

pub fn longitude_field(
  errors: &mut FieldErrors,
  value: Option<&Value>,
) -> Option<f64> {
  let lon = float_field(errors, "longitude", value)?;
  if !(-180.0..=180.0).contains(&lon) {
    errors.push("longitude", LONGITUDE_RANGE);
    return None;
  }
  Some(lon)
}

/// Radius in kilometres; must be strictly positive.
pub fn radius_field(
  errors: &mut FieldErrors,
  value: Option<&Value>,
) -> Option<f64> {
  let radius = float_field(errors, "radius", value)?;
  if radius <= 0.0 {
    errors.push("radius", RADIUS_POSITIVE);
    return None;
  }
  Some(radius)
}

/// Validate the `latitude`/`longitude` pair of `fields` into a coordinate.
pub fn coordinate(
  errors: &mut FieldErrors,
  fields: &Map<String, Value>,
) -> Option<Coordinate> {
  let lat = latitude_field(errors, fields.get("latitude"));
  let lon = longitude_field(errors, fields.get("longitude"));
  Some(Coordinate::new(lon?, lat?))
}

/// Validate `latitude`, `longitude` and `radius` into a [`SearchArea`].
///
/// All three are required; a partial set fails as a whole.
pub fn search_area(fields: &Map<String, Value>) -> Result<SearchArea, FieldErrors> {
  let mut errors = FieldErrors::new();
  let center = coordinate(&mut errors, fields);
  let radius = radius_field(&mut errors, fields.get("radius"));

  match (center, radius) {
    (Some(center), Some(radius_km)) if errors.is_empty() => {
      Ok(SearchArea { center, radius_km })
    }
    _ => Err(errors),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn fields(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  #[test]
  fn accepts_numbers_and_numeric_strings() {
    let area = search_area(&fields(json!({
      "latitude": "55.75", "longitude": 37.62, "radius": "3"
    })))
    .unwrap();
    assert_eq!(area.center, Coordinate::new(37.62, 55.75));
    assert_eq!(area.radius_km, 3.0);
  }

  #[test]
  fn boundaries_are_inclusive() {
    for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0)] {
      let area = search_area(&fields(json!({
        "latitude": lat, "longitude": lon, "radius": 1
      })));
      assert!(area.is_ok(), "({lat}, {lon}) rejected");
    }
  }

  #[test]
  fn out_of_range_coordinates_are_keyed_to_their_field() {
    let errors = search_area(&fields(json!({
      "latitude": 91, "longitude": -180.5, "radius": 1
    })))
    .unwrap_err();
    assert_eq!(errors.get("latitude"), Some(&[LATITUDE_RANGE.to_owned()][..]));
    assert_eq!(errors.get("longitude"), Some(&[LONGITUDE_RANGE.to_owned()][..]));
    assert!(errors.get("radius").is_none());
  }

  #[test]
  fn non_positive_radius_is_rejected() {
    for radius in [0.0, -1.0, -0.0001] {
      let errors = search_area(&fields(json!({
        "latitude": 0, "longitude": 0, "radius": radius
      })))
      .unwrap_err();
      assert_eq!(errors.fields().collect::<Vec<_>>(), ["radius"]);
      assert_eq!(errors.get("radius").unwrap()[0], RADIUS_POSITIVE);
    }
  }

  #[test]
  fn partial_parameter_set_fails_as_a_whole() {
    let errors = search_area(&fields(json!({ "latitude": 10 }))).unwrap_err();
    assert_eq!(errors.get("longitude").unwrap()[0], REQUIRED);
    assert_eq!(errors.get("radius").unwrap()[0], REQUIRED);
    assert!(errors.get("latitude").is_none());
  }

  #[test]
  fn garbage_and_non_finite_numbers_are_invalid() {
    let errors = search_area(&fields(json!({
      "latitude": "north", "longitude": true, "radius": "NaN"
    })))
    .unwrap_err();
    for field in ["latitude", "longitude", "radius"] {
      assert_eq!(errors.get(field).unwrap()[0], INVALID_NUMBER, "{field}");
    }
  }

  #[test]
  fn null_is_reported_separately_from_missing() {
    let mut errors = FieldErrors::new();
    assert!(float_field(&mut errors, "radius", Some(&Value::Null)).is_none());
    assert_eq!(errors.get("radius").unwrap()[0], NOT_NULL);
  }

  #[test]
  fn char_field_trims_and_rejects_blank() {
    let mut errors = FieldErrors::new();
    let title = json!("  Red Square ");
    assert_eq!(
      char_field(&mut errors, "title", Some(&title), Some(TITLE_MAX_LENGTH)),
      Some("Red Square".to_owned())
    );
    let blank = json!(" \t\n ");
    assert!(char_field(&mut errors, "text", Some(&blank), None).is_none());
    assert_eq!(errors.get("text").unwrap()[0], NOT_BLANK);
  }

  #[test]
  fn char_field_rejects_nul_characters() {
    let mut errors = FieldErrors::new();
    for (field, raw) in [("title", "\u{0}x"), ("text", "hello\u{0}")] {
      let value = json!(raw);
      assert!(char_field(&mut errors, field, Some(&value), None).is_none());
      assert_eq!(errors.get(field).unwrap()[0], NULL_CHARACTER);
    }
  }

  #[test]
  fn char_field_enforces_max_length() {
    let mut errors = FieldErrors::new();
    let long = Value::String("x".repeat(TITLE_MAX_LENGTH + 1));
    assert!(char_field(&mut errors, "title", Some(&long), Some(TITLE_MAX_LENGTH)).is_none());
    assert!(errors.get("title").unwrap()[0].contains("255"));
  }

  #[test]
  fn uuid_field_rejects_non_uuids() {
    let mut errors = FieldErrors::new();
    assert!(uuid_field(&mut errors, "point_id", Some(&json!(42))).is_none());
    assert!(uuid_field(&mut errors, "point_id", Some(&json!("nope"))).is_none());
    assert_eq!(errors.get("point_id").unwrap().len(), 2);

    let id = Uuid::new_v4();
    let mut errors = FieldErrors::new();
    assert_eq!(
      uuid_field(&mut errors, "point_id", Some(&json!(id.to_string()))),
      Some(id)
    );
  }

  #[test]
  fn field_errors_serialise_as_a_plain_map() {
    let errors = FieldErrors::single("radius", RADIUS_POSITIVE);
    assert_eq!(
      serde_json::to_value(&errors).unwrap(),
      json!({ "radius": [RADIUS_POSITIVE] })
    );
  }
}
