//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskly_core` linkage.
//! - Print a read-only summary of the database named by `TASKLY_DB_PATH`.

use taskly_core::db::open_db;
use taskly_core::{ProfileStore, SqliteKvRepository, TaskStore};

fn main() {
    println!("taskly_core ping={}", taskly_core::ping());
    println!("taskly_core version={}", taskly_core::core_version());

    let Some(path) = std::env::var_os("TASKLY_DB_PATH") else {
        return;
    };
    let conn = match open_db(&path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("taskly_core db_open failed: {err}");
            std::process::exit(1);
        }
    };

    let tasks = TaskStore::load(SqliteKvRepository::new(&conn));
    let profile = ProfileStore::load(SqliteKvRepository::new(&conn));
    println!(
        "Hello {}: {} tasks, {} pending",
        profile.greeting_name(),
        tasks.len(),
        tasks.pending_count()
    );
}
