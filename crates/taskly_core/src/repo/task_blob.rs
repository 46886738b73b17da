//! JSON codec for the persisted task collection.
//!
//! # Responsibility
//! - Encode the whole collection as one JSON array.
//! - Decode and validate a stored array before it reaches a store.
//!
//! # Invariants
//! - Only a blob that is not a JSON array fails as a whole.
//! - Records that do not parse or fail `Task::validate()` are dropped alone.
//! - Of records sharing an id, the first one wins.
//! - Encoding and decoding preserve collection order.

use crate::model::task::{Task, TaskId, TaskValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to decode a stored task array, or one of its records.
#[derive(Debug)]
pub enum TaskBlobError {
    Json(serde_json::Error),
    UnreadableRecord {
        index: usize,
        source: serde_json::Error,
    },
    InvalidRecord {
        index: usize,
        source: TaskValidationError,
    },
    DuplicateId {
        index: usize,
        id: TaskId,
    },
}

impl TaskBlobError {
    /// Position of the offending record, for per-record failures.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Json(_) => None,
            Self::UnreadableRecord { index, .. }
            | Self::InvalidRecord { index, .. }
            | Self::DuplicateId { index, .. } => Some(*index),
        }
    }
}

/// Records recovered from a stored array, plus the ones left out.
#[derive(Debug, Default)]
pub struct DecodedTasks {
    pub tasks: Vec<Task>,
    pub rejected: Vec<TaskBlobError>,
}

impl Display for TaskBlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed task json: {err}"),
            Self::UnreadableRecord { index, source } => {
                write!(f, "unreadable task record at index {index}: {source}")
            }
            Self::InvalidRecord { index, source } => {
                write!(f, "invalid task record at index {index}: {source}")
            }
            Self::DuplicateId { index, id } => {
                write!(f, "duplicate task id `{id}` at index {index}")
            }
        }
    }
}

impl Error for TaskBlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnreadableRecord { source, .. } => Some(source),
            Self::InvalidRecord { source, .. } => Some(source),
            Self::DuplicateId { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TaskBlobError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes the collection in order.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Parses a stored collection record by record.
///
/// # Errors
/// - The blob is not a JSON array. Bad records inside a valid array are
///   reported in [`DecodedTasks::rejected`] instead.
pub fn decode_tasks(raw: &str) -> Result<DecodedTasks, TaskBlobError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(raw)?;

    let mut decoded = DecodedTasks {
        tasks: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };
    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let task: Task = match serde_json::from_value(record) {
            Ok(task) => task,
            Err(source) => {
                decoded
                    .rejected
                    .push(TaskBlobError::UnreadableRecord { index, source });
                continue;
            }
        };
        if let Err(source) = task.validate() {
            decoded
                .rejected
                .push(TaskBlobError::InvalidRecord { index, source });
            continue;
        }
        if !seen.insert(task.id.clone()) {
            decoded.rejected.push(TaskBlobError::DuplicateId { index, id: task.id });
            continue;
        }
        decoded.tasks.push(task);
    }

    Ok(decoded)
}
