//! Ordered layout changes for the entry database.
//!
//! Each step is a SQL script under this directory. The number of the last
//! applied step is stored in `PRAGMA user_version`, so a fresh file runs
//! every step and an up-to-date file runs none.
//!
//! # Invariants
//! - Step numbers start at 1 and grow by exactly one.
//! - All pending steps commit together or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Layout number a fully migrated entry database reports.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file is ahead of this build.
/// - SQLite failures; nothing is committed in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

/// Layout number currently recorded on `conn`; `0` for a blank file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
