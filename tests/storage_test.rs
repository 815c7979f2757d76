//! Behaviour tests for the synchronous engine.
//!
//! Covers:
//! - set/get visibility and absent keys
//! - deep merge through the store
//! - chunked batch removal
//! - clear, size cap and schema version reset

mod common;

use common::TestFixture;
use kvlite::storage::batch::MAX_SQL_KEYS;
use kvlite::{KvStorage, StorageError};
use serde_json::{json, Value};

fn stored_json(storage: &KvStorage, key: &str) -> Value {
    let raw = storage.get(key).unwrap().expect("key should exist");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_set_then_get_returns_value() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    for (key, value) in [("a", "1"), ("unicode-ключ", "значение"), ("json", r#"{"x":[1,2]}"#), ("empty", "")] {
        storage.set(key, value).unwrap();
        assert_eq!(storage.get(key).unwrap().as_deref(), Some(value));
    }
}

#[test]
fn test_get_absent_and_removed_keys() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    assert_eq!(storage.get("never-written").unwrap(), None);

    storage.set("gone", "v").unwrap();
    assert_eq!(storage.remove(&["gone"]).unwrap(), 1);
    assert_eq!(storage.get("gone").unwrap(), None);
}

#[test]
fn test_set_overwrites() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    storage.set("k", "first").unwrap();
    storage.set("k", "second").unwrap();

    assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
    assert_eq!(storage.list_keys().unwrap(), vec!["k".to_string()]);
}

#[test]
fn test_merge_two_level_document() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    storage.set("doc", r#"{"a":1,"b":{"x":1,"y":2}}"#).unwrap();
    storage.merge("doc", r#"{"b":{"y":3,"z":4},"c":5}"#).unwrap();

    assert_eq!(
        stored_json(&storage, "doc"),
        json!({"a": 1, "b": {"x": 1, "y": 3, "z": 4}, "c": 5})
    );
}

#[test]
fn test_merge_absent_key_stores_new_value() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    storage.merge("fresh", r#"{"b":{"y":3}}"#).unwrap();
    assert_eq!(storage.get("fresh").unwrap().as_deref(), Some(r#"{"b":{"y":3}}"#));
}

#[test]
fn test_merge_rejects_non_object_new_value() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();
    storage.set("doc", r#"{"a":1}"#).unwrap();

    let err = storage.merge("doc", "[1,2,3]").unwrap_err();
    assert!(matches!(err, StorageError::MalformedJson(_)));
    assert_eq!(stored_json(&storage, "doc"), json!({"a": 1}));
}

#[test]
fn test_remove_more_keys_than_chunk_size() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    let keys: Vec<String> = (0..1_500).map(|i| format!("key-{i:04}")).collect();
    storage
        .run_in_transaction(|tx| {
            for key in &keys {
                kvlite::storage::codec::set_item(tx, key, "v")?;
            }
            Ok(())
        })
        .unwrap();
    storage.set("survivor", "v").unwrap();
    assert!(keys.len() > MAX_SQL_KEYS);

    // Include keys that do not exist; they must not be counted
    let mut to_remove = keys.clone();
    to_remove.push("missing-1".into());
    to_remove.push("missing-2".into());

    assert_eq!(storage.remove(&to_remove).unwrap(), 1_500);
    assert_eq!(storage.list_keys().unwrap(), vec!["survivor".to_string()]);
}

#[test]
fn test_remove_failing_in_second_chunk_deletes_nothing() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();

    let keys: Vec<String> = (0..1_500).map(|i| format!("key-{i:04}")).collect();
    storage
        .run_in_transaction(|tx| {
            for key in &keys {
                kvlite::storage::codec::set_item(tx, key, "v")?;
            }
            // Abort on a key that only the second chunk deletes
            tx.execute_batch(
                "CREATE TRIGGER block_delete BEFORE DELETE ON catalystLocalStorage
                 WHEN old.key = 'key-1200'
                 BEGIN SELECT RAISE(ABORT, 'delete blocked'); END",
            )?;
            Ok(())
        })
        .unwrap();
    assert!(keys.iter().position(|k| k == "key-1200").unwrap() >= MAX_SQL_KEYS);

    let err = storage.remove(&keys).unwrap_err();
    assert!(matches!(err, StorageError::Database(_)), "got {err:?}");

    // The first chunk's deletes were rolled back with the second
    assert_eq!(storage.list_keys().unwrap().len(), 1_500);
    assert_eq!(storage.get("key-0000").unwrap().as_deref(), Some("v"));
}

#[test]
fn test_remove_nothing() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();
    let none: Vec<String> = Vec::new();
    assert_eq!(storage.remove(&none).unwrap(), 0);
}

#[test]
fn test_clear_returns_prior_count() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();
    for i in 0..5 {
        storage.set(&format!("k{i}"), "v").unwrap();
    }

    assert_eq!(storage.clear().unwrap(), 5);
    assert!(storage.list_keys().unwrap().is_empty());
}

#[test]
fn test_clear_and_close_then_reopen() {
    let fixture = TestFixture::new();
    let storage = fixture.storage();
    storage.set("k", "v").unwrap();

    storage.clear_and_close().unwrap();

    // Next call reopens an empty store
    assert!(storage.list_keys().unwrap().is_empty());
    storage.set("k", "again").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("again"));
}

#[test]
fn test_write_over_size_cap_is_rejected() {
    let fixture = TestFixture::new();
    let mut config = fixture.config();
    config.max_size_bytes = 64 * 1024;
    let storage = KvStorage::open(config).unwrap();

    storage.set("small", "ok").unwrap();

    let huge = "x".repeat(512 * 1024);
    let err = storage.set("huge", &huge).unwrap_err();
    assert!(matches!(err, StorageError::WriteRejected(_)), "got {err:?}");

    // Nothing was truncated or half-written, and small writes still work
    assert_eq!(storage.get("huge").unwrap(), None);
    storage.set("after", "ok").unwrap();
    assert_eq!(storage.get("small").unwrap().as_deref(), Some("ok"));
}

#[test]
fn test_data_survives_reopen() {
    let fixture = TestFixture::new();
    {
        let storage = fixture.storage();
        storage.set("persistent", "yes").unwrap();
        storage.close().unwrap();
    }

    let storage = fixture.storage();
    assert_eq!(storage.get("persistent").unwrap().as_deref(), Some("yes"));
}

#[test]
fn test_schema_version_mismatch_wipes_store() {
    let fixture = TestFixture::new();
    {
        let storage = fixture.storage();
        storage.set("old", "data").unwrap();
        storage.close().unwrap();
    }

    {
        let conn = rusqlite::Connection::open(fixture.db_path()).unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();
    }

    let storage = fixture.storage();
    assert!(storage.list_keys().unwrap().is_empty());
    storage.set("new", "data").unwrap();
    assert_eq!(storage.get("new").unwrap().as_deref(), Some("data"));
}
