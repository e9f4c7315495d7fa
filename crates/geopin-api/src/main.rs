//! geopin server binary.
//!
//! Loads `.env` if present, reads `geopin.toml` (or the path given with
//! `--config`) plus `GEOPIN_*` environment variables, opens the SQLite store
//! and serves the JSON API over HTTP.
//!
//! # Users
//!
//! Every endpoint requires HTTP Basic credentials. Create an account with:
//!
//! ```text
//! cargo run -p geopin-api --bin geopin-server -- add-user alice
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use geopin_api::{AppState, ServerConfig, auth::hash_password};
use geopin_core::store::GeoStore;
use geopin_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "geopin geospatial notes server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "geopin.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create a user; the password is read from stdin.
  AddUser { username: String },
  /// Delete a user together with their points and messages.
  DeleteUser { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = config.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, config).await,
    Command::AddUser { username } => {
      let username = username.trim().to_owned();
      anyhow::ensure!(!username.is_empty(), "username may not be blank");
      let password = read_password()?;
      anyhow::ensure!(!password.is_empty(), "password may not be empty");

      let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
      let user = store
        .add_user(username, hash)
        .await
        .context("failed to add user")?;
      println!("created user {} ({})", user.username, user.user_id);
      Ok(())
    }
    Command::DeleteUser { username } => {
      let deleted = store
        .delete_user(username.clone())
        .await
        .context("failed to delete user")?;
      anyhow::ensure!(deleted, "no such user: {username}");
      println!("deleted user {username}");
      Ok(())
    }
  }
}

async fn serve(store: SqliteStore, config: ServerConfig) -> anyhow::Result<()> {
  let address = config.address();
  let state = AppState::new(Arc::new(store));
  let app = geopin_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
