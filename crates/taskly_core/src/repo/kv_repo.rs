//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide string get/set over durable storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `set` fully replaces the value under a key in one statement.
//! - Keys are opaque; callers own their naming.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the JSON task array.
pub const TASKS_KEY: &str = "tasks_v6_fixed_with_name";
/// Storage key holding the plain display name.
pub const PROFILE_NAME_KEY: &str = "user_name_v1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was handed over before migrations ran.
    SchemaNotReady { db_version: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady {
                db_version,
                expected,
            } => write!(
                f,
                "key-value schema not ready: version {db_version}, expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string storage addressed by key.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }
}

/// SQLite-backed key-value repository.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking migrations were applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let db_version = current_user_version(conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(RepoError::SchemaNotReady {
                db_version,
                expected,
            });
        }
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
