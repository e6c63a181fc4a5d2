use super::rules::RuleCache;
use super::Store;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    Store::run_migrations(&pool).await.unwrap();
    Store {
        pool,
        rule_cache: Arc::new(RwLock::new(RuleCache::default())),
    }
}

// --- Rules ---

#[tokio::test]
async fn test_upsert_then_get() {
    let store = test_store().await;
    store.upsert_rule("Hello", "hi there").await.unwrap();

    // Trigger is folded to lower case on write; lookup folds too.
    assert_eq!(
        store.get_reply("hello").await.unwrap().as_deref(),
        Some("hi there")
    );
    assert_eq!(
        store.get_reply("HELLO").await.unwrap().as_deref(),
        Some("hi there")
    );
}

#[tokio::test]
async fn test_upsert_overwrites_last_write_wins() {
    let store = test_store().await;
    store.upsert_rule("hello", "first").await.unwrap();
    store.upsert_rule("hello", "second").await.unwrap();

    assert_eq!(
        store.get_reply("hello").await.unwrap().as_deref(),
        Some("second")
    );
    // Still exactly one row.
    assert_eq!(store.list_rules().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_trigger_rejected() {
    let store = test_store().await;
    assert!(store.upsert_rule("", "reply").await.is_err());
    assert!(store.upsert_rule("   ", "reply").await.is_err());
    assert!(store.list_rules().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_rule() {
    let store = test_store().await;
    store.upsert_rule("bye", "see you").await.unwrap();

    assert!(store.remove_rule("bye").await.unwrap());
    assert!(store.get_reply("bye").await.unwrap().is_none());
    // Removing an absent rule reports false without altering the store.
    assert!(!store.remove_rule("bye").await.unwrap());
}

#[tokio::test]
async fn test_list_rules_in_insertion_order() {
    let store = test_store().await;
    store.upsert_rule("charlie", "3").await.unwrap();
    store.upsert_rule("alpha", "1").await.unwrap();
    store.upsert_rule("bravo", "2").await.unwrap();

    let rules = store.list_rules().await.unwrap();
    let triggers: Vec<&str> = rules.iter().map(|(t, _)| t.as_str()).collect();
    // Storage order, not alphabetical.
    assert_eq!(triggers, vec!["charlie", "alpha", "bravo"]);
}

#[tokio::test]
async fn test_overwrite_keeps_storage_position() {
    let store = test_store().await;
    store.upsert_rule("one", "a").await.unwrap();
    store.upsert_rule("two", "b").await.unwrap();
    store.upsert_rule("one", "updated").await.unwrap();

    let rules = store.list_rules().await.unwrap();
    assert_eq!(rules[0], ("one".to_string(), "updated".to_string()));
    assert_eq!(rules[1], ("two".to_string(), "b".to_string()));
}

#[tokio::test]
async fn test_snapshot_reflects_mutations() {
    let store = test_store().await;
    store.upsert_rule("hello", "hi").await.unwrap();

    let before = store.rules_snapshot().await.unwrap();
    assert_eq!(before.len(), 1);

    store.upsert_rule("bye", "later").await.unwrap();

    // The old snapshot is untouched; a fresh one sees the new rule.
    assert_eq!(before.len(), 1);
    let after = store.rules_snapshot().await.unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_snapshot_shared_across_clones() {
    let store = test_store().await;
    let clone = store.clone();

    store.upsert_rule("hello", "hi").await.unwrap();
    let snap = clone.rules_snapshot().await.unwrap();
    assert_eq!(snap.len(), 1, "clone should see the shared cache");
}

// --- Contacts ---

#[tokio::test]
async fn test_contact_add_and_membership() {
    let store = test_store().await;
    store.add_contact("919876543210").await.unwrap();

    assert!(store.is_allowed("919876543210").await.unwrap());
    assert!(!store.is_allowed("911112223334").await.unwrap());
}

#[tokio::test]
async fn test_contact_set_semantics() {
    let store = test_store().await;
    store.add_contact("919876543210").await.unwrap();
    store.add_contact("919876543210").await.unwrap();

    assert_eq!(store.list_contacts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_contact_remove() {
    let store = test_store().await;
    store.add_contact("919876543210").await.unwrap();

    assert!(store.remove_contact("919876543210").await.unwrap());
    assert!(!store.is_allowed("919876543210").await.unwrap());
    assert!(!store.remove_contact("919876543210").await.unwrap());
}

// --- Schedules ---

#[tokio::test]
async fn test_schedule_upsert_and_get() {
    let store = test_store().await;
    let sched = store
        .upsert_schedule("919876543210", "Good morning!", 8, 0)
        .await
        .unwrap();

    assert_eq!(sched.id, "919876543210_08:00");

    let fetched = store.get_schedule("919876543210_08:00").await.unwrap();
    assert_eq!(fetched, Some(sched));
}

#[tokio::test]
async fn test_schedule_same_contact_time_replaces() {
    let store = test_store().await;
    store
        .upsert_schedule("919876543210", "old message", 8, 0)
        .await
        .unwrap();
    store
        .upsert_schedule("919876543210", "new message", 8, 0)
        .await
        .unwrap();

    let all = store.list_schedules().await.unwrap();
    assert_eq!(all.len(), 1, "same contact+time must not duplicate");
    assert_eq!(all[0].message, "new message");
}

#[tokio::test]
async fn test_schedule_delete() {
    let store = test_store().await;
    store
        .upsert_schedule("919876543210", "Good morning!", 8, 0)
        .await
        .unwrap();

    assert!(store.delete_schedule("919876543210_08:00").await.unwrap());
    assert!(store
        .get_schedule("919876543210_08:00")
        .await
        .unwrap()
        .is_none());
    assert!(!store.delete_schedule("919876543210_08:00").await.unwrap());
}

#[tokio::test]
async fn test_schedule_invalid_time_rejected() {
    let store = test_store().await;
    assert!(store
        .upsert_schedule("919876543210", "msg", 24, 0)
        .await
        .is_err());
    assert!(store
        .upsert_schedule("919876543210", "msg", 8, 60)
        .await
        .is_err());
}

#[tokio::test]
async fn test_list_schedules_in_storage_order() {
    let store = test_store().await;
    store
        .upsert_schedule("919876543210", "evening", 20, 30)
        .await
        .unwrap();
    store
        .upsert_schedule("911112223334", "morning", 8, 0)
        .await
        .unwrap();

    let all = store.list_schedules().await.unwrap();
    assert_eq!(all[0].id, "919876543210_20:30");
    assert_eq!(all[1].id, "911112223334_08:00");
}
