use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use taskly_core::db::open_db_in_memory;
use taskly_core::{
    FormSubmission, Priority, Repeat, SqliteKvRepository, StoreChange, TaskDraft, TaskForm,
    TaskStore, TASK_COLORS,
};

#[test]
fn default_form_matches_new_task_defaults() {
    let form = TaskForm::default();

    assert!(!form.is_editing());
    assert!(form.title.is_empty());
    assert!(form.description.is_empty());
    assert_eq!(form.due_at, None);
    assert_eq!(form.priority, Priority::Normal);
    assert!(!form.remind);
    assert_eq!(form.remind_at, None);
    assert_eq!(form.repeat, Repeat::None);
    assert_eq!(form.color, TASK_COLORS[0]);
}

#[test]
fn new_form_submits_as_add_and_edit_form_as_update() {
    let mut form = TaskForm::default();
    form.title = "New".to_string();
    assert!(matches!(form.into_submission(), FormSubmission::Add(_)));

    let mut edit = TaskForm::default();
    edit.editing_id = Some("42".to_string());
    edit.title = "Edited".to_string();
    match edit.into_submission() {
        FormSubmission::Update(id, patch) => {
            assert_eq!(id, "42");
            assert_eq!(patch.title.as_deref(), Some("Edited"));
            assert_eq!(patch.completed, Some(false));
        }
        other => panic!("expected update, got {other:?}"),
    }
}

fn utc_plus_five() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600).unwrap()
}

#[test]
fn apply_due_date_keeps_chosen_time() {
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    let mut form = TaskForm::default();
    form.due_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 14, 45, 0).unwrap());

    form.apply_due_date(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), &now);

    assert_eq!(
        form.due_at,
        Some(Utc.with_ymd_and_hms(2024, 2, 10, 14, 45, 0).unwrap())
    );
}

#[test]
fn apply_due_date_without_time_uses_current_time_of_day() {
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 20, 15).unwrap();
    let mut form = TaskForm::default();

    form.apply_due_date(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), &now);

    assert_eq!(
        form.due_at,
        Some(Utc.with_ymd_and_hms(2024, 2, 10, 8, 20, 15).unwrap())
    );
}

#[test]
fn apply_due_date_keeps_local_time_of_day_across_utc_midnight() {
    let now = utc_plus_five().with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    let mut form = TaskForm::default();
    // 01:30 on Jan 2 at UTC+5.
    form.due_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 20, 30, 0).unwrap());

    form.apply_due_date(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), &now);

    assert_eq!(
        form.due_at,
        Some(Utc.with_ymd_and_hms(2024, 2, 9, 20, 30, 0).unwrap())
    );
}

#[test]
fn apply_due_time_defaults_date_and_reminder_to_today() {
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    let mut form = TaskForm::default();

    form.apply_due_time(NaiveTime::from_hms_opt(17, 30, 59).unwrap(), &now);

    let expected = Utc.with_ymd_and_hms(2024, 3, 5, 17, 30, 0).unwrap();
    assert_eq!(form.due_at, Some(expected));
    assert_eq!(form.remind_at, Some(expected));
}

#[test]
fn apply_due_time_reads_picked_time_on_local_clock() {
    // 01:00 on Mar 5 at UTC+5 is still Mar 4 in UTC.
    let now = utc_plus_five().with_ymd_and_hms(2024, 3, 5, 1, 0, 0).unwrap();
    let mut form = TaskForm::default();

    form.apply_due_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), &now);

    let expected = Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap();
    assert_eq!(form.due_at, Some(expected));
    assert_eq!(form.remind_at, Some(expected));
    assert_eq!(
        form.due_at.map(|due| due.with_timezone(&utc_plus_five()).time()),
        NaiveTime::from_hms_opt(9, 0, 0)
    );
}

#[test]
fn apply_due_time_keeps_existing_date_and_reminder() {
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    let reminder = Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap();
    let mut form = TaskForm::default();
    form.due_at = Some(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
    form.remind_at = Some(reminder);

    form.apply_due_time(NaiveTime::from_hms_opt(18, 15, 0).unwrap(), &now);

    assert_eq!(
        form.due_at,
        Some(Utc.with_ymd_and_hms(2024, 4, 1, 18, 15, 0).unwrap())
    );
    assert_eq!(form.remind_at, Some(reminder));
}

#[test]
fn submitting_edit_form_reopens_task_and_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let mut store = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    let added = store.add(TaskDraft::titled("Draft title"));
    let id = added.task_id().unwrap().to_string();
    store.toggle_complete(&id);
    assert!(store.get(&id).unwrap().completed);

    let mut form = TaskForm::from_task(store.get(&id).unwrap());
    form.title = "Final title".to_string();
    form.priority = Priority::High;
    form.repeat = Repeat::Daily;
    let outcome = store.submit(form);

    assert_eq!(outcome.change, StoreChange::Updated { id: id.clone() });
    let task = store.get(&id).unwrap();
    assert_eq!(task.title, "Final title");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.repeat, Repeat::Daily);
    assert!(!task.completed);
    assert_eq!(store.len(), 1);
    assert_eq!(store.pending_count(), 1);
}

#[test]
fn submitting_unchanged_edit_form_still_reopens_task() {
    let conn = open_db_in_memory().unwrap();
    let mut store = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    let id = store
        .add(TaskDraft::titled("Done already"))
        .task_id()
        .unwrap()
        .to_string();
    store.toggle_complete(&id);

    let form = TaskForm::from_task(store.get(&id).unwrap());
    store.submit(form);

    let reloaded = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    assert!(!reloaded.get(&id).unwrap().completed);
}

#[test]
fn submitting_new_form_prepends_task() {
    let conn = open_db_in_memory().unwrap();
    let mut store = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    store.add(TaskDraft::titled("older"));

    let mut form = TaskForm::default();
    form.title = "  newer ".to_string();
    form.description = "   ".to_string();
    form.color = TASK_COLORS[2].to_string();
    store.submit(form);

    let first = &store.tasks()[0];
    assert_eq!(first.title, "newer");
    assert_eq!(first.description, None);
    assert_eq!(first.color, TASK_COLORS[2]);
}
