//! Binding sessions to Chrome WebSQL databases.
//!
//! Chrome keeps one shared catalog (`Databases.db`) per profile that maps
//! `(origin, name)` pairs to numeric row ids, and stores each database as a
//! file named after its row id inside a per-origin directory. See
//! Chromium's `DatabasesTable::GetDatabaseID` for the canonical layout;
//! this module reads and extends that catalog so a notebook session gets a
//! stable database of its own.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{named_params, Connection, OptionalExtension};
use serde::Serialize;

use crate::session::Session;

/// Estimated size recorded for newly registered databases (1 MiB).
const ESTIMATED_SIZE: i64 = 1024 * 1024;

/// File name of the shared catalog inside the profile databases directory.
const CATALOG_FILE: &str = "Databases.db";

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no catalog entry for origin {origin} and name {name}")]
    DatabaseNotFound { origin: String, name: String },

    /// Any storage failure, including the uniqueness violation raised by a
    /// duplicate registration race. Not retried; at most one catalog entry
    /// may exist per (origin, description) pair.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// One row of the shared catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub estimated_size: i64,
}

/// Handle on a Chrome profile's databases directory.
///
/// Connections to the catalog store are short-lived: each operation opens
/// one, runs its statement or pair of statements, and drops it.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The default Chrome profile databases directory for this platform.
    #[cfg(windows)]
    pub fn default_root() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("Google")
            .join("Chrome")
            .join("User Data")
            .join("Default")
            .join("databases")
    }

    /// The default Chrome profile databases directory for this platform.
    #[cfg(not(windows))]
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("Library")
            .join("Application Support")
            .join("Google")
            .join("Chrome")
            .join("Profile 1")
            .join("databases")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open_store(&self) -> Result<Connection, CatalogError> {
        Ok(Connection::open(self.root.join(CATALOG_FILE))?)
    }

    /// Find or create the database name bound to `(origin, session)`.
    ///
    /// Looks the session up by its notebook path first, so repeated
    /// resolution of the same session is idempotent. On a miss the session
    /// guid is registered as the database name. A concurrent registration
    /// of the same session loses to the catalog's uniqueness constraint
    /// and surfaces as [`CatalogError::Sqlite`].
    pub fn database_name(&self, origin: &str, session: &Session) -> Result<String, CatalogError> {
        let conn = self.open_store()?;
        let existing = conn
            .query_row(
                "SELECT name FROM Databases WHERE origin = :origin AND description = :description",
                named_params! { ":origin": origin, ":description": &session.path },
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        if let Some(name) = existing {
            debug!("[catalog] {} already bound to {}", session.path, name);
            return Ok(name);
        }

        conn.execute(
            "INSERT INTO Databases (origin, name, description, estimated_size) \
             VALUES (:origin, :name, :description, :estimated_size)",
            named_params! {
                ":origin": origin,
                ":name": &session.id,
                ":description": &session.path,
                ":estimated_size": ESTIMATED_SIZE,
            },
        )?;
        info!(
            "[catalog] registered database {} for {} under {}",
            session.id, session.path, origin
        );
        Ok(session.id.clone())
    }

    /// Open the per-origin database file registered as `(origin, name)`.
    ///
    /// The file lives at `<root>/<origin>/<row id>`; fails with
    /// [`CatalogError::DatabaseNotFound`] when the catalog has no such row.
    pub fn connect(&self, origin: &str, name: &str) -> Result<Connection, CatalogError> {
        let id = {
            let conn = self.open_store()?;
            conn.query_row(
                "SELECT id FROM Databases WHERE origin = :origin AND name = :name",
                named_params! { ":origin": origin, ":name": name },
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        };
        let id = id.ok_or_else(|| CatalogError::DatabaseNotFound {
            origin: origin.to_string(),
            name: name.to_string(),
        })?;
        Ok(Connection::open(self.root.join(origin).join(id.to_string()))?)
    }

    /// List the catalog entries registered under `origin`, oldest first.
    pub fn databases(&self, origin: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.open_store()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, estimated_size FROM Databases \
             WHERE origin = :origin ORDER BY id",
        )?;
        let entries = stmt
            .query_map(named_params! { ":origin": origin }, |row| {
                Ok(CatalogEntry {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    estimated_size: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
