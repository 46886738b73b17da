//! Task store: owned in-memory collection mirrored to durable storage.
//!
//! # Responsibility
//! - Own the ordered task collection and every mutation on it.
//! - Re-serialize and write the whole collection after each mutation.
//!
//! # Invariants
//! - New tasks are prepended (newest first).
//! - Ids are unique in the collection and strictly increasing per store.
//! - Validation rejections never write; not-found paths still write.
//! - Writes are synchronous, so durable state follows call order.
//! - Task titles are never logged.

use crate::model::task::{normalize_title, Task, TaskDraft, TaskId, TaskPatch};
use crate::repo::kv_repo::{KvRepository, TASKS_KEY};
use crate::repo::task_blob::{decode_tasks, encode_tasks};
use crate::service::outcome::{MutationOutcome, PersistStatus, Skip, StoreChange};
use crate::service::task_form::{FormSubmission, TaskForm};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

/// Task collection bound to a key-value repository.
pub struct TaskStore<R: KvRepository> {
    repo: R,
    tasks: Vec<Task>,
    last_issued_id: i64,
}

impl<R: KvRepository> TaskStore<R> {
    /// Loads the persisted collection.
    ///
    /// Missing, unreadable or malformed data yields an empty collection and
    /// a log line; loading never fails. Individual bad records are dropped
    /// with one warning each and the rest of the collection is kept.
    pub fn load(repo: R) -> Self {
        let tasks = match repo.get(TASKS_KEY) {
            Ok(Some(raw)) => match decode_tasks(&raw) {
                Ok(decoded) => {
                    for rejected in &decoded.rejected {
                        warn!(
                            "event=tasks_load module=task_store status=skip error_code=bad_record index={} error={rejected}",
                            rejected.index().unwrap_or_default()
                        );
                    }
                    info!(
                        "event=tasks_load module=task_store status=ok count={} dropped={}",
                        decoded.tasks.len(),
                        decoded.rejected.len()
                    );
                    decoded.tasks
                }
                Err(err) => {
                    warn!(
                        "event=tasks_load module=task_store status=error error_code=malformed_blob error={err}"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("event=tasks_load module=task_store status=ok count=0 stored=false");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=tasks_load module=task_store status=error error_code=read_failed error={err}"
                );
                Vec::new()
            }
        };

        Self {
            repo,
            tasks,
            last_issued_id: 0,
        }
    }

    /// Current collection, newest additions first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed.
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_pending()).count()
    }

    /// Adds a task built from `draft`, using the current time for its id.
    pub fn add(&mut self, draft: TaskDraft) -> MutationOutcome {
        self.add_at(draft, Utc::now())
    }

    /// Adds a task whose id derives from `now`.
    pub fn add_at(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> MutationOutcome {
        if normalize_title(&draft.title).is_none() {
            debug!("event=task_add module=task_store status=skip reason=empty_title");
            return MutationOutcome::rejected(Skip::EmptyTitle);
        }

        let id = self.issue_id(now.timestamp_millis());
        let task = match Task::from_draft(id, draft) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=task_store status=skip reason={err}");
                return MutationOutcome::rejected(Skip::EmptyTitle);
            }
        };

        let id = task.id.clone();
        self.tasks.insert(0, task);
        let persist = self.persist("add");
        MutationOutcome::new(StoreChange::Added { id }, persist)
    }

    /// Adds the quick-add demo task.
    pub fn add_sample(&mut self, now: DateTime<Utc>) -> MutationOutcome {
        self.add_at(TaskDraft::sample(now), now)
    }

    /// Merges `patch` over the task with `id`.
    ///
    /// A blank supplied title rejects the update without writing.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> MutationOutcome {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            let persist = self.persist("update");
            return MutationOutcome::new(StoreChange::Unchanged(Skip::NotFound), persist);
        };

        let task = &mut self.tasks[index];
        if let Err(err) = task.apply_patch(patch) {
            debug!("event=task_update module=task_store status=skip reason={err}");
            return MutationOutcome::rejected(Skip::EmptyTitle);
        }

        let id = task.id.clone();
        let persist = self.persist("update");
        MutationOutcome::new(StoreChange::Updated { id }, persist)
    }

    /// Flips the completion flag of the task with `id`.
    pub fn toggle_complete(&mut self, id: &str) -> MutationOutcome {
        let toggled = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .map(|task| (task.id.clone(), task.toggle_completed()));

        let persist = self.persist("toggle");
        match toggled {
            Some((id, completed)) => {
                MutationOutcome::new(StoreChange::Toggled { id, completed }, persist)
            }
            None => MutationOutcome::new(StoreChange::Unchanged(Skip::NotFound), persist),
        }
    }

    /// Removes the task with `id`.
    pub fn remove(&mut self, id: &str) -> MutationOutcome {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = before != self.tasks.len();

        let persist = self.persist("remove");
        if removed {
            MutationOutcome::new(
                StoreChange::Removed {
                    id: id.to_string(),
                },
                persist,
            )
        } else {
            MutationOutcome::new(StoreChange::Unchanged(Skip::NotFound), persist)
        }
    }

    /// Empties the collection.
    pub fn clear(&mut self) -> MutationOutcome {
        let removed = self.tasks.len();
        self.tasks.clear();
        let persist = self.persist("clear");
        MutationOutcome::new(StoreChange::Cleared { removed }, persist)
    }

    /// Applies a submitted form: add when new, update when editing.
    pub fn submit(&mut self, form: TaskForm) -> MutationOutcome {
        match form.into_submission() {
            FormSubmission::Add(draft) => self.add(draft),
            FormSubmission::Update(id, patch) => self.update(&id, patch),
        }
    }

    fn issue_id(&mut self, now_ms: i64) -> TaskId {
        let mut candidate = now_ms.max(self.last_issued_id + 1);
        while self.contains_id(candidate) {
            candidate += 1;
        }
        self.last_issued_id = candidate;
        candidate.to_string()
    }

    fn contains_id(&self, candidate: i64) -> bool {
        let candidate = candidate.to_string();
        self.tasks.iter().any(|task| task.id == candidate)
    }

    fn persist(&self, op: &'static str) -> PersistStatus {
        let encoded = match encode_tasks(&self.tasks) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=tasks_persist module=task_store status=error op={op} error_code=encode_failed error={err}"
                );
                return PersistStatus::Failed;
            }
        };

        match self.repo.set(TASKS_KEY, &encoded) {
            Ok(()) => {
                debug!(
                    "event=tasks_persist module=task_store status=ok op={op} count={} bytes={}",
                    self.tasks.len(),
                    encoded.len()
                );
                PersistStatus::Written
            }
            Err(err) => {
                error!(
                    "event=tasks_persist module=task_store status=error op={op} error_code=write_failed error={err}"
                );
                PersistStatus::Failed
            }
        }
    }
}
