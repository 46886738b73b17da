use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use taskly_core::db::open_db_in_memory;
use taskly_core::{
    KvRepository, MutationOutcome, PersistStatus, Priority, RepoError, RepoResult, Skip,
    SqliteKvRepository, StoreChange, TaskDraft, TaskPatch, TaskStore, TASKS_KEY,
};

fn store(conn: &Connection) -> TaskStore<SqliteKvRepository<'_>> {
    TaskStore::load(SqliteKvRepository::try_new(conn).unwrap())
}

fn added_id(outcome: &MutationOutcome) -> String {
    match &outcome.change {
        StoreChange::Added { id } => id.clone(),
        other => panic!("expected Added, got {other:?}"),
    }
}

#[test]
fn load_without_stored_blob_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    assert!(store.is_empty());
    assert_eq!(store.pending_count(), 0);
}

#[test]
fn adds_prepend_and_count_matches() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);

    let titles = ["first", "second", "third"];
    for title in titles {
        let outcome = store.add(TaskDraft::titled(title));
        assert_eq!(outcome.persist, PersistStatus::Written);
    }

    assert_eq!(store.len(), titles.len());
    assert_eq!(store.tasks()[0].title, "third");
    assert_eq!(store.tasks()[2].title, "first");
}

#[test]
fn ids_are_unique_and_increasing_within_one_millisecond() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();

    let first = added_id(&store.add_at(TaskDraft::titled("a"), now));
    let second = added_id(&store.add_at(TaskDraft::titled("b"), now));

    assert_eq!(first, now.timestamp_millis().to_string());
    assert_eq!(second, (now.timestamp_millis() + 1).to_string());
}

#[test]
fn ids_skip_values_already_in_loaded_collection() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set(TASKS_KEY, r#"[{"id":"1000","title":"loaded"}]"#)
        .unwrap();

    let mut store = TaskStore::load(repo);
    let now = Utc.timestamp_millis_opt(1000).unwrap();
    let id = added_id(&store.add_at(TaskDraft::titled("fresh"), now));

    assert_eq!(id, "1001");
}

#[test]
fn add_with_blank_title_is_a_silent_no_op() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    store.add(TaskDraft::titled("existing"));

    for title in ["", "   ", "\n\t"] {
        let outcome = store.add(TaskDraft::titled(title));
        assert_eq!(outcome.change, StoreChange::Unchanged(Skip::EmptyTitle));
        assert_eq!(outcome.persist, PersistStatus::Skipped);
    }
    assert_eq!(store.len(), 1);
}

#[test]
fn update_completed_changes_only_that_flag() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let target = added_id(&store.add(TaskDraft {
        priority: Priority::High,
        description: Some("details".to_string()),
        ..TaskDraft::titled("target")
    }));
    store.add(TaskDraft::titled("bystander"));
    let before = store.tasks().to_vec();

    let outcome = store.update(&target, TaskPatch::completed(true));
    assert_eq!(outcome.change, StoreChange::Updated { id: target.clone() });

    let after = store.tasks();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(after) {
        if new.id == target {
            let mut expected = old.clone();
            expected.completed = true;
            assert_eq!(new, &expected);
        } else {
            assert_eq!(new, old);
        }
    }
}

#[test]
fn update_unknown_id_does_not_create_a_record() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    store.add(TaskDraft::titled("only"));
    let before = store.tasks().to_vec();

    let outcome = store.update("missing", TaskPatch::title("ghost"));

    assert_eq!(outcome.change, StoreChange::Unchanged(Skip::NotFound));
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn update_with_blank_title_is_rejected_like_add() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let id = added_id(&store.add(TaskDraft::titled("Keep title")));

    let outcome = store.update(&id, TaskPatch::title("  "));

    assert_eq!(outcome.change, StoreChange::Unchanged(Skip::EmptyTitle));
    assert_eq!(outcome.persist, PersistStatus::Skipped);
    assert_eq!(store.get(&id).unwrap().title, "Keep title");
}

#[test]
fn update_trims_supplied_title() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let id = added_id(&store.add(TaskDraft::titled("draft")));

    store.update(&id, TaskPatch::title("  final  "));

    assert_eq!(store.get(&id).unwrap().title, "final");
}

#[test]
fn toggle_flips_back_and_forth() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let id = added_id(&store.add(TaskDraft::titled("flip")));

    let first = store.toggle_complete(&id);
    assert_eq!(
        first.change,
        StoreChange::Toggled {
            id: id.clone(),
            completed: true
        }
    );
    assert_eq!(store.pending_count(), 0);

    store.toggle_complete(&id);
    assert!(!store.get(&id).unwrap().completed);
    assert_eq!(store.pending_count(), 1);

    let missing = store.toggle_complete("nope");
    assert_eq!(missing.change, StoreChange::Unchanged(Skip::NotFound));
}

#[test]
fn remove_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let id = added_id(&store.add(TaskDraft::titled("gone")));
    store.add(TaskDraft::titled("stays"));

    let first = store.remove(&id);
    assert_eq!(first.change, StoreChange::Removed { id: id.clone() });
    let after_first = store.tasks().to_vec();

    let second = store.remove(&id);
    assert_eq!(second.change, StoreChange::Unchanged(Skip::NotFound));
    assert_eq!(store.tasks(), after_first.as_slice());
    assert_eq!(store.len(), 1);
}

#[test]
fn every_mutation_is_mirrored_to_storage() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    let id = added_id(&store.add(TaskDraft::titled("mirror")));
    store.toggle_complete(&id);
    store.add_sample(Utc::now());

    let reloaded = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    assert_eq!(reloaded.tasks(), store.tasks());
    assert!(reloaded.get(&id).unwrap().completed);
}

#[test]
fn clear_then_reload_yields_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);
    store.add(TaskDraft::titled("a"));
    store.add(TaskDraft::titled("b"));

    let outcome = store.clear();
    assert_eq!(outcome.change, StoreChange::Cleared { removed: 2 });
    assert!(store.is_empty());

    let reloaded = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    assert!(reloaded.is_empty());
    let raw = SqliteKvRepository::try_new(&conn)
        .unwrap()
        .get(TASKS_KEY)
        .unwrap();
    assert_eq!(raw.as_deref(), Some("[]"));
}

#[test]
fn malformed_blob_degrades_to_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set(TASKS_KEY, "{\"broken\":").unwrap();

    let mut store = TaskStore::load(repo);
    assert!(store.is_empty());

    store.add(TaskDraft::titled("recovered"));
    let reloaded = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn bad_records_are_dropped_without_losing_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set(
        TASKS_KEY,
        r#"[{"id":"2","title":"kept"},{"id":"1","title":""},{"id":"2","title":"dup"}]"#,
    )
    .unwrap();

    let mut store = TaskStore::load(repo);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("2").unwrap().title, "kept");

    let outcome = store.toggle_complete("missing");
    assert_eq!(outcome.change, StoreChange::Unchanged(Skip::NotFound));

    let reloaded = TaskStore::load(SqliteKvRepository::try_new(&conn).unwrap());
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get("2").unwrap().title, "kept");
}

#[test]
fn buy_milk_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let mut store = store(&conn);

    let id = added_id(&store.add(TaskDraft::titled("Buy milk")));
    let task = store.get(&id).unwrap();
    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Normal);

    store.toggle_complete(&id);
    assert!(store.get(&id).unwrap().completed);

    store.remove(&id);
    assert!(store.is_empty());
}

struct ReadOnlyRepo;

impl KvRepository for ReadOnlyRepo {
    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::SchemaNotReady {
            db_version: 0,
            expected: 1,
        })
    }
}

#[test]
fn write_failure_keeps_in_memory_state_and_reports_failed() {
    let mut store = TaskStore::load(ReadOnlyRepo);

    let outcome = store.add(TaskDraft::titled("memory only"));

    assert!(outcome.is_change());
    assert_eq!(outcome.persist, PersistStatus::Failed);
    assert_eq!(store.len(), 1);
}
