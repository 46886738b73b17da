//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task/profile use cases the UI needs to Dart via FRB.
//! - Translate timestamps to and from RFC 3339 strings at the boundary.
//! - Read picked dates and times on the device clock given by the caller.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store sessions run one at a time per process, so writes never overlap.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc};
use log::{error, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use taskly_core::db::open_db;
use taskly_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    MutationOutcome, PersistStatus, Priority, ProfileStore, Repeat, Skip, SqliteKvRepository,
    StoreChange, Task, TaskForm, TaskStore,
};

const ENTRY_DB_FILE_NAME: &str = "taskly_entry.sqlite3";
const DB_PATH_ENV: &str = "TASKLY_DB_PATH";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
/// Same `level + log_dir` is idempotent; reconfiguration is an error.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task row as rendered by the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// RFC 3339 instant.
    pub due_at: Option<String>,
    /// `Low|Normal|High`.
    pub priority: String,
    pub remind: bool,
    pub remind_at: Option<String>,
    /// `none|daily|weekly`.
    pub repeat: String,
    pub color: String,
}

/// List envelope with the header's pending counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub pending_count: u32,
    pub message: String,
}

/// Add/edit form values exchanged with the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFormInput {
    /// Set when editing an existing task.
    pub editing_id: Option<String>,
    pub title: String,
    pub description: String,
    pub due_at: Option<String>,
    pub priority: String,
    pub remind: bool,
    pub remind_at: Option<String>,
    pub repeat: String,
    pub color: String,
}

/// Form envelope returned after a date or time pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFormResponse {
    pub ok: bool,
    /// Updated form on success; the unchanged input otherwise.
    pub form: TaskFormInput,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the use case took effect.
    pub ok: bool,
    /// Affected task id, when any.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Profile envelope driving the greeting and the first-run prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    pub name: Option<String>,
    pub greeting_name: String,
    pub needs_prompt: bool,
    pub message: String,
}

impl TaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }

    fn from_outcome(outcome: &MutationOutcome) -> Self {
        let message = match (&outcome.change, outcome.persist) {
            (StoreChange::Unchanged(Skip::EmptyTitle), _) => "Title is required.".to_string(),
            (StoreChange::Unchanged(Skip::NotFound), _) => "Task not found.".to_string(),
            (_, PersistStatus::Failed) => "Saved in memory only; write failed.".to_string(),
            (StoreChange::Added { .. }, _) => "Task added.".to_string(),
            (StoreChange::Updated { .. }, _) => "Task updated.".to_string(),
            (StoreChange::Toggled { completed, .. }, _) => {
                if *completed {
                    "Task completed.".to_string()
                } else {
                    "Task reopened.".to_string()
                }
            }
            (StoreChange::Removed { .. }, _) => "Task deleted.".to_string(),
            (StoreChange::Cleared { removed }, _) => format!("Cleared {removed} task(s)."),
            (StoreChange::NameSaved, _) | (StoreChange::Unchanged(Skip::EmptyName), _) => {
                String::new()
            }
        };
        Self {
            ok: outcome.is_change(),
            task_id: outcome.task_id().map(str::to_string),
            message,
        }
    }
}

/// Lists tasks in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_store(|store| {
        let items = store.tasks().iter().map(to_task_item).collect::<Vec<_>>();
        (items, store.pending_count())
    }) {
        Ok((items, pending)) => TaskListResponse {
            message: format!("{pending} tasks are pending"),
            pending_count: u32::try_from(pending).unwrap_or(u32::MAX),
            items,
        },
        Err(err) => TaskListResponse {
            items: Vec::new(),
            pending_count: 0,
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Returns the values of an empty add form.
#[flutter_rust_bridge::frb(sync)]
pub fn task_form_defaults() -> TaskFormInput {
    to_form_input(TaskForm::default())
}

/// Returns the values of the edit form for `id`, if the task exists.
#[flutter_rust_bridge::frb(sync)]
pub fn task_form_for_edit(id: String) -> Option<TaskFormInput> {
    with_task_store(|store| store.get(&id).map(TaskForm::from_task))
        .ok()
        .flatten()
        .map(to_form_input)
}

/// Sets the form's due date to the picked calendar day.
///
/// `utc_offset_minutes` is the device's current offset from UTC
/// (`+300` for UTC+5). Without a due time yet, the current time of day is used.
#[flutter_rust_bridge::frb(sync)]
pub fn task_form_pick_due_date(
    form: TaskFormInput,
    year: i32,
    month: u32,
    day: u32,
    utc_offset_minutes: i32,
) -> TaskFormResponse {
    pick_on_form("task_form_pick_due_date", form, utc_offset_minutes, |task_form, now| {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| format!("invalid date {year:04}-{month:02}-{day:02}"))?;
        task_form.apply_due_date(date, now);
        Ok(())
    })
}

/// Sets the form's due time of day, defaulting the date and reminder to today.
///
/// `utc_offset_minutes` has the same meaning as in [`task_form_pick_due_date`].
#[flutter_rust_bridge::frb(sync)]
pub fn task_form_pick_due_time(
    form: TaskFormInput,
    hour: u32,
    minute: u32,
    utc_offset_minutes: i32,
) -> TaskFormResponse {
    pick_on_form("task_form_pick_due_time", form, utc_offset_minutes, |task_form, now| {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| format!("invalid time {hour:02}:{minute:02}"))?;
        task_form.apply_due_time(time, now);
        Ok(())
    })
}

/// Submits the add/edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn task_submit(form: TaskFormInput) -> TaskActionResponse {
    let form = match parse_form(form) {
        Ok(form) => form,
        Err(err) => {
            warn!("event=task_submit module=ffi status=error error_code=invalid_form error={err}");
            return TaskActionResponse::failure(format!("task_submit failed: {err}"));
        }
    };
    run_task_action("task_submit", |store| store.submit(form))
}

/// Flips completion of `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    run_task_action("task_toggle", |store| store.toggle_complete(&id))
}

/// Deletes `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    run_task_action("task_delete", |store| store.remove(&id))
}

/// Deletes every task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_clear_all() -> TaskActionResponse {
    run_task_action("task_clear_all", |store| store.clear())
}

/// Adds the quick-add demo task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add_sample() -> TaskActionResponse {
    run_task_action("task_add_sample", |store| store.add_sample(Utc::now()))
}

/// Reads the saved display name.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_load() -> ProfileResponse {
    match with_profile_store(|store| to_profile_response(store, true, String::new())) {
        Ok(response) => response,
        Err(err) => profile_failure(format!("profile_load failed: {err}")),
    }
}

/// Saves a display name; blank names are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_save(name: String) -> ProfileResponse {
    let result = with_profile_store(|store| {
        let outcome = store.save(&name);
        let message = match (&outcome.change, outcome.persist) {
            (StoreChange::Unchanged(_), _) => "Name is required.",
            (_, PersistStatus::Failed) => "Saved in memory only; write failed.",
            _ => "Name saved.",
        };
        to_profile_response(store, outcome.is_change(), message.to_string())
    });
    match result {
        Ok(response) => response,
        Err(err) => profile_failure(format!("profile_save failed: {err}")),
    }
}

fn run_task_action(
    name: &str,
    action: impl FnOnce(&mut TaskStore<SqliteKvRepository<'_>>) -> MutationOutcome,
) -> TaskActionResponse {
    match with_task_store(action) {
        Ok(outcome) => TaskActionResponse::from_outcome(&outcome),
        Err(err) => TaskActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn pick_on_form(
    name: &str,
    input: TaskFormInput,
    utc_offset_minutes: i32,
    apply: impl FnOnce(&mut TaskForm, &DateTime<FixedOffset>) -> Result<(), String>,
) -> TaskFormResponse {
    let picked = device_now(utc_offset_minutes).and_then(|now| {
        let mut form = parse_form(input.clone())?;
        apply(&mut form, &now)?;
        Ok(form)
    });
    match picked {
        Ok(form) => TaskFormResponse {
            ok: true,
            form: to_form_input(form),
            message: String::new(),
        },
        Err(err) => {
            warn!("event={name} module=ffi status=error error_code=invalid_pick error={err}");
            TaskFormResponse {
                ok: false,
                form: input,
                message: format!("{name} failed: {err}"),
            }
        }
    }
}

fn device_now(utc_offset_minutes: i32) -> Result<DateTime<FixedOffset>, String> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("invalid utc offset {utc_offset_minutes} minutes"))?;
    Ok(Utc::now().with_timezone(&offset))
}

fn with_task_store<T>(
    f: impl FnOnce(&mut TaskStore<SqliteKvRepository<'_>>) -> T,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteKvRepository::try_new(conn)
            .map_err(|err| format!("entry repo init failed: {err}"))?;
        let mut store = TaskStore::load(repo);
        Ok(f(&mut store))
    })
    .map_err(|err| {
        error!("event=task_session module=ffi status=error error={err}");
        err
    })
}

fn with_profile_store<T>(
    f: impl FnOnce(&mut ProfileStore<SqliteKvRepository<'_>>) -> T,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteKvRepository::try_new(conn)
            .map_err(|err| format!("entry repo init failed: {err}"))?;
        let mut store = ProfileStore::load(repo);
        Ok(f(&mut store))
    })
    .map_err(|err| {
        error!("event=profile_session module=ffi status=error error={err}");
        err
    })
}

fn with_connection<T>(
    f: impl FnOnce(&Connection) -> Result<T, String>,
) -> Result<T, String> {
    // A poisoned lock only means an earlier session panicked; state lives in SQLite.
    let _session = SESSION_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| format!("entry DB open failed: {err}"))?;
    f(&conn)
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn to_profile_response(
    store: &ProfileStore<SqliteKvRepository<'_>>,
    ok: bool,
    message: String,
) -> ProfileResponse {
    ProfileResponse {
        ok,
        name: store.name().map(str::to_string),
        greeting_name: store.greeting_name().to_string(),
        needs_prompt: store.needs_prompt(),
        message,
    }
}

fn profile_failure(message: String) -> ProfileResponse {
    ProfileResponse {
        ok: false,
        name: None,
        greeting_name: taskly_core::GREETING_FALLBACK.to_string(),
        needs_prompt: true,
        message,
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        due_at: task.due_at.map(format_instant),
        priority: task.priority.label().to_string(),
        remind: task.remind,
        remind_at: task.remind_at.map(format_instant),
        repeat: task.repeat.label().to_string(),
        color: task.color.clone(),
    }
}

fn to_form_input(form: TaskForm) -> TaskFormInput {
    TaskFormInput {
        editing_id: form.editing_id,
        title: form.title,
        description: form.description,
        due_at: form.due_at.map(format_instant),
        priority: form.priority.label().to_string(),
        remind: form.remind,
        remind_at: form.remind_at.map(format_instant),
        repeat: form.repeat.label().to_string(),
        color: form.color,
    }
}

fn parse_form(input: TaskFormInput) -> Result<TaskForm, String> {
    let priority = Priority::parse(input.priority.trim())
        .ok_or_else(|| format!("unknown priority `{}`", input.priority))?;
    let repeat = Repeat::parse(input.repeat.trim())
        .ok_or_else(|| format!("unknown repeat `{}`", input.repeat))?;

    Ok(TaskForm {
        editing_id: input.editing_id.filter(|id| !id.trim().is_empty()),
        title: input.title,
        description: input.description,
        due_at: parse_instant("due_at", input.due_at.as_deref())?,
        priority,
        remind: input.remind,
        remind_at: parse_instant("remind_at", input.remind_at.as_deref())?,
        repeat,
        color: input.color,
    })
}

fn parse_instant(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|err| format!("invalid {field} `{raw}`: {err}")),
    }
}

fn format_instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
