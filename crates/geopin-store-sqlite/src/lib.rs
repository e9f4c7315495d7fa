//! SQLite backend for geopin.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Radius queries are answered in SQL via
//! a `geodesic_distance_m` scalar function registered on the connection.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
