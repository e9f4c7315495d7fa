//! The two record kinds served by the generic create and search handlers.
//!
//! A [`GeoResource`] fills the handler's capability slots: how to validate a
//! create body, which field receives the authenticated identity, and which
//! store query answers a radius search.

use std::future::Future;

use geopin_core::{
  geo::{Coordinate, SearchArea},
  message::{Message, NewMessage},
  point::{NewPoint, Point},
  store::GeoStore,
  validate::{self, FieldErrors},
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub trait GeoResource<S: GeoStore>: Send + Sync + 'static {
  /// Validated create body, not yet attributed to anyone.
  type Draft;
  /// Insert payload with the owning identity filled in.
  type New: Send + 'static;
  /// The persisted record as returned to clients.
  type Record: Serialize + Send + 'static;

  /// Validate a create request body.
  fn parse_draft(body: &Map<String, Value>) -> Result<Self::Draft, FieldErrors>;

  /// Attribution slot: bind the draft to the requesting user.
  fn attribute(draft: Self::Draft, user_id: Uuid) -> Self::New;

  fn insert(
    store: &S,
    new: Self::New,
  ) -> impl Future<Output = Result<Self::Record, S::Error>> + Send + '_;

  /// Radius predicate slot.
  fn within_radius(
    store: &S,
    area: SearchArea,
  ) -> impl Future<Output = Result<Vec<Self::Record>, S::Error>> + Send + '_;
}

// ─── Points ──────────────────────────────────────────────────────────────────

/// `/api/points/`: body `{title, latitude, longitude}`; owner is the requester.
pub struct Points;

#[derive(Debug)]
pub struct PointDraft {
  pub title:    String,
  pub location: Coordinate,
}

impl<S: GeoStore> GeoResource<S> for Points {
  type Draft = PointDraft;
  type New = NewPoint;
  type Record = Point;

  fn parse_draft(body: &Map<String, Value>) -> Result<PointDraft, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = validate::char_field(
      &mut errors,
      "title",
      body.get("title"),
      Some(validate::TITLE_MAX_LENGTH),
    );
    let location = validate::coordinate(&mut errors, body);

    match (title, location) {
      (Some(title), Some(location)) => Ok(PointDraft { title, location }),
      _ => Err(errors),
    }
  }

  fn attribute(draft: PointDraft, user_id: Uuid) -> NewPoint {
    NewPoint {
      owner:    user_id,
      title:    draft.title,
      location: draft.location,
    }
  }

  fn insert(
    store: &S,
    new: NewPoint,
  ) -> impl Future<Output = Result<Point, S::Error>> + Send + '_ {
    store.create_point(new)
  }

  fn within_radius(
    store: &S,
    area: SearchArea,
  ) -> impl Future<Output = Result<Vec<Point>, S::Error>> + Send + '_ {
    store.points_within(area.center, area.radius_km)
  }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// `/api/points/messages/`: body `{point_id, text}`; author is the requester.
pub struct Messages;

#[derive(Debug)]
pub struct MessageDraft {
  pub point_id: Uuid,
  pub text:     String,
}

impl<S: GeoStore> GeoResource<S> for Messages {
  type Draft = MessageDraft;
  type New = NewMessage;
  type Record = Message;

  fn parse_draft(body: &Map<String, Value>) -> Result<MessageDraft, FieldErrors> {
    let mut errors = FieldErrors::new();
    let point_id = validate::uuid_field(&mut errors, "point_id", body.get("point_id"));
    let text = validate::char_field(&mut errors, "text", body.get("text"), None);

    match (point_id, text) {
      (Some(point_id), Some(text)) => Ok(MessageDraft { point_id, text }),
      _ => Err(errors),
    }
  }

  fn attribute(draft: MessageDraft, user_id: Uuid) -> NewMessage {
    NewMessage {
      point_id: draft.point_id,
      author:   user_id,
      text:     draft.text,
    }
  }

  fn insert(
    store: &S,
    new: NewMessage,
  ) -> impl Future<Output = Result<Message, S::Error>> + Send + '_ {
    store.create_message(new)
  }

  fn within_radius(
    store: &S,
    area: SearchArea,
  ) -> impl Future<Output = Result<Vec<Message>, S::Error>> + Send + '_ {
    store.messages_within(area.center, area.radius_km)
  }
}
