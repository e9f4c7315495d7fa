//! SQL schema for the geopin SQLite store.
//!
//! Executed once at connection startup. The schema version is recorded in
//! `PRAGMA user_version` for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Locations are longitude/latitude degrees under a fixed geographic SRID.
CREATE TABLE IF NOT EXISTS points (
    point_id   TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title      TEXT NOT NULL CHECK (length(trim(title, char(32, 9, 10, 13))) BETWEEN 1 AND 255),
    longitude  REAL NOT NULL,
    latitude   REAL NOT NULL,
    srid       INTEGER NOT NULL DEFAULT 4326 CHECK (srid = 4326),
    created_at TEXT NOT NULL   -- RFC 3339 UTC, fixed microsecond precision
);

CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    point_id   TEXT NOT NULL REFERENCES points(point_id) ON DELETE CASCADE,
    author_id  TEXT NOT NULL REFERENCES users(user_id)   ON DELETE CASCADE,
    text       TEXT NOT NULL CHECK (length(trim(text, char(32, 9, 10, 13))) > 0),
    created_at TEXT NOT NULL
);

-- Radius queries prefilter on a latitude band before the distance function.
CREATE INDEX IF NOT EXISTS points_location_idx ON points(latitude, longitude);
CREATE INDEX IF NOT EXISTS points_owner_idx    ON points(owner_id);
CREATE INDEX IF NOT EXISTS messages_point_idx  ON messages(point_id);
CREATE INDEX IF NOT EXISTS messages_author_idx ON messages(author_id);

PRAGMA user_version = 1;
";
