//! Durable home of Taskly's key-value entries.
//!
//! The task array and the display name each live as one text value in the
//! `kv_entries` table. This module only hands out connections on which that
//! table is guaranteed to exist; what the values mean is up to `repo`.
//!
//! # Invariants
//! - A connection returned from here carries the newest `kv_entries` layout.
//! - A file written by a newer build is refused rather than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or prepare the entry database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file records a layout this build does not know.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "entry database is at layout {db_version}; this build only knows up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
