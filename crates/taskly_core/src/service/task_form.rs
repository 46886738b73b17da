//! Add/edit form values and their submission.
//!
//! # Responsibility
//! - Provide default form values for a new task.
//! - Compose due/remind instants from picked dates and times.
//! - Turn a filled form into an add or an update.
//!
//! # Invariants
//! - Submitting an edit reopens the task (`completed` becomes false).
//! - Picked dates and times are read on the caller's clock (`now`'s zone)
//!   and stored as UTC instants.
//! - Picked times are truncated to whole minutes.

use crate::model::task::{default_task_color, Priority, Repeat, Task, TaskDraft, TaskId, TaskPatch};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// Values backing the add/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Set when the form edits an existing task.
    pub editing_id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub remind: bool,
    pub remind_at: Option<DateTime<Utc>>,
    pub repeat: Repeat,
    pub color: String,
}

/// What a submitted form asks the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Add(TaskDraft),
    Update(TaskId, TaskPatch),
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            editing_id: None,
            title: String::new(),
            description: String::new(),
            due_at: None,
            priority: Priority::default(),
            remind: false,
            remind_at: None,
            repeat: Repeat::default(),
            color: default_task_color(),
        }
    }
}

impl TaskForm {
    /// Form pre-filled for editing `task`.
    pub fn from_task(task: &Task) -> Self {
        Self {
            editing_id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_at: task.due_at,
            priority: task.priority,
            remind: task.remind,
            remind_at: task.remind_at,
            repeat: task.repeat,
            color: task.color.clone(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Sets the due calendar date, keeping an already picked time of day.
    ///
    /// Without a due time yet, the time of day of `now` is used, the way a
    /// date picker opened on the current moment reports it.
    pub fn apply_due_date<Tz: TimeZone>(&mut self, date: NaiveDate, now: &DateTime<Tz>) {
        let zone = now.timezone();
        let time = self
            .due_at
            .map(|due| due.with_timezone(&zone).time())
            .unwrap_or_else(|| now.time());
        self.due_at = Some(local_instant(&zone, date, time));
    }

    /// Sets the due time of day on the picked date, or on today's date.
    ///
    /// The reminder defaults to today at the same time when none is set.
    /// "Today" is the calendar date of `now` in its own zone.
    pub fn apply_due_time<Tz: TimeZone>(&mut self, time: NaiveTime, now: &DateTime<Tz>) {
        let zone = now.timezone();
        let time = whole_minute(time);
        let today = now.date_naive();
        let date = self
            .due_at
            .map(|due| due.with_timezone(&zone).date_naive())
            .unwrap_or(today);
        self.due_at = Some(local_instant(&zone, date, time));

        if self.remind_at.is_none() {
            self.remind_at = Some(local_instant(&zone, today, time));
        }
    }

    /// Converts the form into a store command.
    pub fn into_submission(self) -> FormSubmission {
        match self.editing_id {
            None => FormSubmission::Add(TaskDraft {
                title: self.title,
                description: Some(self.description),
                due_at: self.due_at,
                priority: self.priority,
                remind: self.remind,
                remind_at: self.remind_at,
                repeat: self.repeat,
                color: self.color,
            }),
            Some(id) => FormSubmission::Update(
                id,
                TaskPatch {
                    title: Some(self.title),
                    description: Some(Some(self.description)),
                    completed: Some(false),
                    due_at: Some(self.due_at),
                    priority: Some(self.priority),
                    remind: Some(self.remind),
                    remind_at: Some(self.remind_at),
                    repeat: Some(self.repeat),
                    color: Some(self.color),
                },
            ),
        }
    }
}

/// Wall-clock `date` + `time` in `zone`, as UTC.
///
/// Ambiguous local times take the earlier instant; a time skipped by a DST
/// jump moves forward by one hour.
fn local_instant<Tz: TimeZone>(zone: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = date.and_time(time);
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

fn whole_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
