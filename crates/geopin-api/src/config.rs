//! Runtime configuration.
//!
//! Assembled once at start-up from built-in defaults, an optional TOML file
//! and `GEOPIN_*` environment variables (later sources win), then handed to
//! the store and router explicitly.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub const ENV_PREFIX: &'static str = "GEOPIN";

  /// Load configuration, reading `file` if it exists.
  pub fn load(file: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8000)?
      .set_default("store_path", "geopin.sqlite3")?
      .add_source(File::from(file).required(false))
      .add_source(Environment::with_prefix(Self::ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("geopin-{}-{name}", uuid::Uuid::new_v4()))
  }

  #[test]
  fn file_values_override_defaults() {
    let path = temp_path("config.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "port = 9123\nstore_path = \"/var/lib/geopin/db.sqlite3\"").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9123);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/geopin/db.sqlite3"));
    assert_eq!(cfg.address(), format!("{}:9123", cfg.host));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    assert!(ServerConfig::load(&temp_path("absent.toml")).is_ok());
  }

  #[test]
  fn absolute_store_path_is_left_alone() {
    let cfg = ServerConfig {
      host:       "127.0.0.1".into(),
      port:       8000,
      store_path: PathBuf::from("/tmp/geopin.sqlite3"),
    };
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/tmp/geopin.sqlite3"));
  }
}
