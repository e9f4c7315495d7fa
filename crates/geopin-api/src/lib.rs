//! JSON REST API for geopin.
//!
//! Exposes an axum [`Router`] backed by any [`GeoStore`]: authenticated
//! users create points and messages and search either by radius.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = geopin_api::router(AppState::new(Arc::new(store)));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod resource;

pub use config::ServerConfig;
pub use error::ApiError;

use std::sync::Arc;

use axum::{Router, routing::any};
use geopin_core::store::GeoStore;
use tower_http::trace::TraceLayer;

use resource::{Messages, Points};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The `/points` routes, relative to the API root.
fn api_routes<S>() -> Router<AppState<S>>
where
  S: GeoStore + 'static,
{
  Router::new()
    // Points
    .route("/points/",        any(handlers::create::<S, Points>))
    .route("/points/search/", any(handlers::search::<S, Points>))
    // Messages
    .route("/points/messages/",        any(handlers::create::<S, Messages>))
    .route("/points/messages/search/", any(handlers::search::<S, Messages>))
}

/// Build the application router with the API nested under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GeoStore + 'static,
{
  Router::new()
    .nest("/api", api_routes::<S>())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
