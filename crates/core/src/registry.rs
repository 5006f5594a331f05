//! A process-wide, type-erased registry keyed by `(K, TypeId::of::<T>())`.
//!
//! Rust forbids a `static` item whose type depends on an outer generic
//! parameter, so there is no direct way to give every monomorphization of
//! `NestedSet<T>` its own private static singleton the way a non-generic
//! language would. This registry is the workaround: one process-wide,
//! non-generic `DashMap` holding type-erased (`Arc<dyn Any>`) entries,
//! downcast back to the caller's concrete `T` on lookup. The `TypeId` key
//! guarantees the downcast always succeeds for entries this module itself
//! inserted.
use std::any::{Any, TypeId};
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Looks up `(key, TypeId::of::<T>())` in a process-wide cache, computing and
/// inserting `make()` on miss. `K` is the caller's non-generic discriminant
/// (e.g. an [`crate::order::Order`] variant); `T` is the erased payload type.
pub(crate) fn get_or_insert_with<K, T, F>(key: K, make: F) -> Arc<T>
where
    K: Eq + Hash + Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: FnOnce() -> Arc<T>,
{
    static REGISTRY: Lazy<DashMap<(TypeId, TypeId, u64), Arc<dyn Any + Send + Sync>>> =
        Lazy::new(DashMap::new);

    let slot = (TypeId::of::<K>(), TypeId::of::<T>(), stable_hash(&key));
    if let Some(existing) = REGISTRY.get(&slot) {
        if let Ok(typed) = Arc::clone(existing.value()).downcast::<T>() {
            return typed;
        }
    }

    let fresh = make();
    REGISTRY
        .entry(slot)
        .or_insert_with(|| fresh.clone() as Arc<dyn Any + Send + Sync>);
    // Another thread may have won the race; prefer whatever is now stored so
    // that callers relying on pointer identity (e.g. empty-set singletons)
    // observe a single winner.
    REGISTRY
        .get(&slot)
        .and_then(|entry| Arc::clone(entry.value()).downcast::<T>().ok())
        .unwrap_or(fresh)
}

fn stable_hash<K: Hash>(key: &K) -> u64 {
    use std::hash::Hasher;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
