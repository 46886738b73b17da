//! Domain model for tasks and the user profile.
//!
//! # Responsibility
//! - Define the records persisted by the stores.
//! - Keep create/merge/normalization rules next to the data they guard.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard removal from the collection.

pub mod profile;
pub mod task;
