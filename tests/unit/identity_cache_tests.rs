// ==================================
// tests/unit/identity_cache_tests.rs
// ==================================
//! Read-through behaviour of `IdentityCache` against a counting store
use crate::test_utils::{test_clock, CountingStore};
use backend_lib::auth::IdentityCache;
use backend_lib::storage::{FlatFileStorage, UserStore};
use std::time::Duration;
use tempfile::TempDir;

fn setup() -> (IdentityCache<CountingStore>, CountingStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = CountingStore::new(FlatFileStorage::new(dir.path()).unwrap());
    let cache = IdentityCache::new(store.clone(), Duration::from_secs(900), test_clock());
    (cache, store, dir)
}

#[tokio::test]
async fn test_second_resolve_is_served_from_cache() {
    let (cache, store, _dir) = setup();
    store.create_user("ann@example.com", "hash").await.unwrap();

    let first = cache.resolve("ann@example.com").await.unwrap().unwrap();
    assert_eq!(store.lookups(), 1);

    let second = cache.resolve("ann@example.com").await.unwrap().unwrap();
    assert_eq!(store.lookups(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_misses_are_not_cached() {
    let (cache, store, _dir) = setup();
    assert!(cache.resolve("nobody@example.com").await.unwrap().is_none());
    assert!(cache.resolve("nobody@example.com").await.unwrap().is_none());
    assert_eq!(store.lookups(), 2);

    // An account created after a miss is found on the next resolve
    store.create_user("nobody@example.com", "hash").await.unwrap();
    assert!(cache.resolve("nobody@example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_invalidate_forces_store_read() {
    let (cache, store, _dir) = setup();
    store.create_user("ann@example.com", "hash").await.unwrap();
    cache.resolve("ann@example.com").await.unwrap();

    cache.invalidate("ann@example.com");
    cache.resolve("ann@example.com").await.unwrap();
    assert_eq!(store.lookups(), 2);

    // Invalidating an absent key is a no-op
    cache.invalidate("bob@example.com");
}

#[tokio::test]
async fn test_concurrent_resolves_agree() {
    let (cache, store, _dir) = setup();
    store.create_user("ann@example.com", "hash").await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve("ann@example.com").await })
        })
        .collect();
    for task in tasks {
        let user = task.await.unwrap().unwrap().unwrap();
        assert_eq!(user.email, "ann@example.com");
    }
    assert_eq!(cache.len(), 1);
    assert!(store.lookups() >= 1);
}
