use chrono::{TimeZone, Utc};

use misctags::{
    core::store::{RecordStore, StoreError},
    types::Timestamp,
};

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn create_inserts_newest_first_with_equal_timestamps() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["alpha"], at(1)).unwrap();
    let (b, _) = store.create(["beta"], at(2)).unwrap();

    assert_eq!(store.ordered_ids(), &[b.id, a.id]);
    assert_eq!(a.created_at, a.updated_at);
    assert_eq!(store.get(a.id).unwrap().created_at, at(1));
}

#[test]
fn create_twice_is_rejected_case_insensitively() {
    let mut store = RecordStore::new();
    store.create(["Foo", "Bar"], at(1)).unwrap();

    let err = store.create(["foo", "bar"], at(2)).unwrap_err();
    assert_eq!(
        err,
        StoreError::AlreadyExists {
            key: "foo bar".to_string()
        }
    );
    assert_eq!(store.len(), 1);

    // Order is part of the key.
    store.create(["bar", "foo"], at(3)).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn create_rejects_empty_and_blank_tags() {
    let mut store = RecordStore::new();
    assert_eq!(
        store.create(Vec::<String>::new(), at(1)).unwrap_err(),
        StoreError::EmptyTags
    );
    assert_eq!(store.create(["", "  "], at(1)).unwrap_err(), StoreError::EmptyTags);

    let (rec, _) = store.create(["", "kept"], at(1)).unwrap();
    assert_eq!(rec.tags, vec!["kept".to_string()]);
}

#[test]
fn update_bypasses_dedup_and_refreshes_updated_at() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["a"], at(1)).unwrap();
    let (b, _) = store.create(["b"], at(2)).unwrap();

    let op = store.update(b.id, ["a"], at(10)).unwrap();
    assert!(op.is_some());

    let tagged_a: Vec<_> = store.iter().filter(|r| r.tags == ["a"]).map(|r| r.id).collect();
    assert_eq!(tagged_a, vec![b.id, a.id]);
    assert_eq!(store.by_dedup_key("a").len(), 2);
    assert!(store.by_dedup_key("b").is_empty());

    let b_now = store.get(b.id).unwrap();
    assert_eq!(b_now.updated_at, at(10));
    assert_eq!(b_now.created_at, at(2));
}

#[test]
fn update_never_moves_updated_at_before_created_at() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["a"], at(100)).unwrap();
    store.update(a.id, ["b"], at(5)).unwrap();
    let rec = store.get(a.id).unwrap();
    assert!(rec.updated_at >= rec.created_at);
}

#[test]
fn update_and_delete_of_missing_ids_are_noops() {
    let mut store = RecordStore::new();
    store.create(["a"], at(1)).unwrap();
    let before = store.list();

    let ghost = uuid::Uuid::new_v4();
    assert_eq!(store.update(ghost, ["x"], at(2)).unwrap(), None);
    assert_eq!(store.delete(ghost), None);
    assert_eq!(store.list(), before);
}

#[test]
fn delete_then_create_same_tags_succeeds() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["a", "b"], at(1)).unwrap();
    assert!(store.delete(a.id).is_some());
    assert!(store.is_empty());
    store.create(["A", "B"], at(2)).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn revert_restores_exact_state_for_each_op() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["a"], at(1)).unwrap();
    let (b, _) = store.create(["b"], at(2)).unwrap();
    store.create(["c"], at(3)).unwrap();
    let before = store.list();

    let (_, op) = store.create(["d"], at(4)).unwrap();
    store.revert(op);
    assert_eq!(store.list(), before);

    let op = store.update(a.id, ["z"], at(5)).unwrap().unwrap();
    store.revert(op);
    assert_eq!(store.list(), before);
    assert_eq!(store.by_dedup_key("a").len(), 1);
    assert!(store.by_dedup_key("z").is_empty());

    let op = store.delete(b.id).unwrap();
    store.revert(op);
    assert_eq!(store.list(), before);

    let op = store.replace_all(Vec::new());
    assert!(store.is_empty());
    store.revert(op);
    assert_eq!(store.list(), before);
}

#[test]
fn list_returns_detached_copies() {
    let mut store = RecordStore::new();
    let (a, _) = store.create(["a"], at(1)).unwrap();

    let mut listed = store.list();
    listed[0].tags.push("mutated".to_string());

    assert_eq!(store.get(a.id).unwrap().tags, vec!["a".to_string()]);
}

#[test]
fn from_records_keeps_order_and_drops_repeated_ids() {
    let mut source = RecordStore::new();
    let (a, _) = source.create(["a"], at(1)).unwrap();
    let (b, _) = source.create(["b"], at(2)).unwrap();

    let mut records = source.list();
    records.push(a.clone());
    let store = RecordStore::from_records(records);

    assert_eq!(store.ordered_ids(), &[b.id, a.id]);
}
