//! Core use-case services.
//!
//! # Responsibility
//! - Own in-memory task and profile state behind explicit store objects.
//! - Mirror every mutation to the key-value repository.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod outcome;
pub mod profile_store;
pub mod task_form;
pub mod task_store;
