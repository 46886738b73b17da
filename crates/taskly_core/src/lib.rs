//! Core domain logic for Taskly.
//! This crate is the single source of truth for task and profile invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::profile::{Profile, GREETING_FALLBACK};
pub use model::task::{
    default_task_color, Priority, Repeat, Task, TaskDraft, TaskId, TaskPatch,
    TaskValidationError, TASK_COLORS,
};
pub use repo::kv_repo::{
    KvRepository, RepoError, RepoResult, SqliteKvRepository, PROFILE_NAME_KEY, TASKS_KEY,
};
pub use repo::task_blob::{decode_tasks, encode_tasks, DecodedTasks, TaskBlobError};
pub use service::outcome::{MutationOutcome, PersistStatus, Skip, StoreChange};
pub use service::profile_store::ProfileStore;
pub use service::task_form::{FormSubmission, TaskForm};
pub use service::task_store::TaskStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
