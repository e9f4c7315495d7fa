//! Geographic primitives: coordinates, search areas and great-circle distance.
//!
//! All coordinates are longitude/latitude in degrees under [`SRID_WGS84`].
//! Distances are metres unless a name says otherwise.

use serde::{Deserialize, Serialize};

/// EPSG code of the geographic reference system used for every stored
/// location.
pub const SRID_WGS84: i32 = 4326;

/// Mean Earth radius (IUGG), in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub const METERS_PER_KM: f64 = 1_000.0;

/// Slack added to each side of [`Coordinate::latitude_band`] so rounding in
/// the haversine never puts a match outside the band. About 1.1 m.
const LATITUDE_BAND_MARGIN_DEG: f64 = 1e-5;

// ─── Coordinate ──────────────────────────────────────────────────────────────

/// A longitude/latitude pair in degrees.
///
/// Serialised as a GeoJSON `Point`, so `coordinates` is `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJsonPoint", try_from = "GeoJsonPoint")]
pub struct Coordinate {
  pub longitude: f64,
  pub latitude:  f64,
}

impl Coordinate {
  pub fn new(longitude: f64, latitude: f64) -> Self {
    Self { longitude, latitude }
  }

  /// Longitude, following the GIS `x`/`y` convention.
  pub fn x(&self) -> f64 { self.longitude }

  /// Latitude, following the GIS `x`/`y` convention.
  pub fn y(&self) -> f64 { self.latitude }

  pub fn srid(&self) -> i32 { SRID_WGS84 }

  /// The latitude window every point within `radius_m` of `self` falls in.
  ///
  /// Along a meridian the great-circle distance equals `R * Δφ`, and no path
  /// between two latitudes is shorter, so the band is a necessary condition
  /// once widened by [`LATITUDE_BAND_MARGIN_DEG`]. It says nothing about
  /// longitude, which keeps it correct across the antimeridian and near the
  /// poles.
  pub fn latitude_band(&self, radius_m: f64) -> (f64, f64) {
    let delta = (radius_m / EARTH_RADIUS_M).to_degrees() + LATITUDE_BAND_MARGIN_DEG;
    ((self.latitude - delta).max(-90.0), (self.latitude + delta).min(90.0))
  }
}

/// Wire form of [`Coordinate`].
#[derive(Serialize, Deserialize)]
struct GeoJsonPoint {
  #[serde(rename = "type")]
  kind:        String,
  coordinates: [f64; 2],
}

impl From<Coordinate> for GeoJsonPoint {
  fn from(c: Coordinate) -> Self {
    Self {
      kind:        "Point".to_owned(),
      coordinates: [c.longitude, c.latitude],
    }
  }
}

impl TryFrom<GeoJsonPoint> for Coordinate {
  type Error = String;

  fn try_from(p: GeoJsonPoint) -> Result<Self, Self::Error> {
    if p.kind != "Point" {
      return Err(format!("expected a GeoJSON Point, got {:?}", p.kind));
    }
    let [longitude, latitude] = p.coordinates;
    Ok(Self { longitude, latitude })
  }
}

// ─── Search area ─────────────────────────────────────────────────────────────

/// A validated radius query: centre plus radius in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
  pub center:    Coordinate,
  pub radius_km: f64,
}

impl SearchArea {
  /// The radius in the store's native unit.
  pub fn radius_m(&self) -> f64 { self.radius_km * METERS_PER_KM }
}

// ─── Distance ────────────────────────────────────────────────────────────────

/// Great-circle distance between `a` and `b`, in metres.
///
/// Haversine on a sphere of [`EARTH_RADIUS_M`]; stable for short distances
/// and well-behaved across the antimeridian.
pub fn geodesic_distance_m(a: Coordinate, b: Coordinate) -> f64 {
  let lat1 = a.latitude.to_radians();
  let lat2 = b.latitude.to_radians();
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lon = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
  let c = 2.0 * h.sqrt().min(1.0).asin();

  EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_degree_of_latitude_is_about_111_km() {
    let d = geodesic_distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
    assert!((d - 111_195.0).abs() < 50.0, "got {d}");
  }

  #[test]
  fn distance_is_symmetric_and_zero_on_self() {
    let a = Coordinate::new(37.62, 55.75);
    let b = Coordinate::new(30.31, 59.94);
    assert_eq!(geodesic_distance_m(a, a), 0.0);
    assert!((geodesic_distance_m(a, b) - geodesic_distance_m(b, a)).abs() < 1e-6);
  }

  #[test]
  fn antimeridian_neighbours_are_close() {
    let west = Coordinate::new(179.99, 0.0);
    let east = Coordinate::new(-179.99, 0.0);
    assert!(geodesic_distance_m(west, east) < 3_000.0);
  }

  #[test]
  fn fixture_points_straddle_three_km() {
    let center = Coordinate::new(40.01, 40.01);
    assert!(geodesic_distance_m(center, Coordinate::new(40.0, 40.0)) < 3_000.0);
    assert!(geodesic_distance_m(center, Coordinate::new(90.0, 90.0)) > 3_000.0);
  }

  #[test]
  fn latitude_band_contains_matches_and_clamps() {
    let c = Coordinate::new(10.0, 89.99);
    let (lo, hi) = c.latitude_band(5_000.0);
    assert_eq!(hi, 90.0);
    assert!(lo < 89.99 && lo > 89.9);
  }

  #[test]
  fn meridian_point_at_exactly_the_radius_is_inside_the_band() {
    for i in 0..180 {
      let a = Coordinate::new(12.5, -90.0 + f64::from(i) + 0.123_456_789);
      for j in 0..=360 {
        let b = Coordinate::new(12.5, (-90.0 + f64::from(j) * 0.5 + 0.987_654_321).min(90.0));
        let d = geodesic_distance_m(a, b);
        let (lo, hi) = a.latitude_band(d);
        assert!(
          lo <= b.latitude && b.latitude <= hi,
          "{b:?} at {d} m from {a:?} outside [{lo}, {hi}]"
        );
      }
    }
  }

  #[test]
  fn geojson_round_trip_keeps_axis_order() {
    let c = Coordinate::new(37.62, 55.75);
    let json = serde_json::to_value(c).unwrap();
    assert_eq!(json["type"], "Point");
    assert_eq!(json["coordinates"][0], 37.62);
    assert_eq!(json["coordinates"][1], 55.75);
    let back: Coordinate = serde_json::from_value(json).unwrap();
    assert_eq!(back, c);
  }

  #[test]
  fn radius_is_converted_to_meters() {
    let area = SearchArea { center: Coordinate::new(0.0, 0.0), radius_km: 3.0 };
    assert_eq!(area.radius_m(), 3_000.0);
  }
}
