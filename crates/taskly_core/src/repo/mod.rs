//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value persistence contract used by stores.
//! - Isolate SQLite query details and the task JSON codec from services.
//!
//! # Invariants
//! - Stores talk to durable state only through `KvRepository`.
//! - Stored task arrays are validated on decode, never masked.

pub mod kv_repo;
pub mod task_blob;
