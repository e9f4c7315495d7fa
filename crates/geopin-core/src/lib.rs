//! Core types and trait definitions for geopin.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and API crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod geo;
pub mod message;
pub mod point;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{DomainError, Error, Result};
