//! Results reported by store mutations.
//!
//! Stores never return errors to callers. Every mutation reports what
//! happened to memory (`StoreChange`) and to durable state
//! (`PersistStatus`) so the presentation layer can re-read and re-render.

use crate::model::task::TaskId;

/// Why a mutation left in-memory state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    EmptyTitle,
    EmptyName,
    NotFound,
}

/// In-memory effect of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Added { id: TaskId },
    Updated { id: TaskId },
    Toggled { id: TaskId, completed: bool },
    Removed { id: TaskId },
    Cleared { removed: usize },
    NameSaved,
    Unchanged(Skip),
}

/// Durable effect of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStatus {
    Written,
    /// No write was attempted.
    Skipped,
    /// Write failed and was logged; memory keeps the new state.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub change: StoreChange,
    pub persist: PersistStatus,
}

impl MutationOutcome {
    pub(crate) fn new(change: StoreChange, persist: PersistStatus) -> Self {
        Self { change, persist }
    }

    pub(crate) fn rejected(skip: Skip) -> Self {
        Self::new(StoreChange::Unchanged(skip), PersistStatus::Skipped)
    }

    /// Whether memory changed.
    pub fn is_change(&self) -> bool {
        !matches!(self.change, StoreChange::Unchanged(_))
    }

    /// Id carried by task-level changes.
    pub fn task_id(&self) -> Option<&str> {
        match &self.change {
            StoreChange::Added { id }
            | StoreChange::Updated { id }
            | StoreChange::Toggled { id, .. }
            | StoreChange::Removed { id } => Some(id.as_str()),
            _ => None,
        }
    }
}
