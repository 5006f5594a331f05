//! The process-wide weak-keyed cache backing
//! [`crate::builder::NestedSetBuilder::wrap`].
//!
//! Keyed by the identity (allocation address) of the caller-supplied
//! `Arc<[T]>`, not its contents, so that wrapping the same sequence twice
//! under `Order::Stable` returns the very same [`NestedSet`]. The key is
//! held as a `Weak<[T]>`: once the caller drops every strong reference to
//! the sequence, the entry becomes unreclaimable by upgrade and is replaced
//! (not proactively swept) the next time that address is looked up or
//! reused. This matches the design note's "if the runtime lacks weak keys,
//! a bounded LRU is an acceptable approximation" -- here the runtime (Rust)
//! *does* have weak keys, so the genuine weak-table behavior is used
//! instead of the fallback.
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::registry;
use crate::set::NestedSet;

struct Entry<T> {
    sequence: Weak<[T]>,
    set: NestedSet<T>,
}

#[derive(Default)]
struct WrapCache<T> {
    entries: DashMap<usize, Entry<T>>,
}

impl<T> WrapCache<T> {
    fn get_or_build(&self, sequence: &Arc<[T]>, make: impl FnOnce() -> NestedSet<T>) -> NestedSet<T> {
        let key = sequence_identity(sequence);
        if let Some(entry) = self.entries.get(&key) {
            if entry.sequence.upgrade().is_some() {
                return entry.set.clone();
            }
        }
        let set = make();
        self.entries.insert(
            key,
            Entry {
                sequence: Arc::downgrade(sequence),
                set: set.clone(),
            },
        );
        set
    }
}

fn sequence_identity<T>(sequence: &Arc<[T]>) -> usize {
    let fat: *const [T] = Arc::as_ptr(sequence);
    fat as *const u8 as usize
}

fn cache_for<T>() -> Arc<WrapCache<T>>
where
    T: Send + Sync + 'static,
{
    registry::get_or_insert_with((), || Arc::new(WrapCache::default()))
}

/// Looks up `sequence` in the process-wide wrap cache, inserting `make()`'s
/// result on miss (or on a stale/collected entry).
pub(crate) fn get_or_build<T>(
    sequence: &Arc<[T]>,
    make: impl FnOnce() -> NestedSet<T>,
) -> NestedSet<T>
where
    T: Send + Sync + 'static,
{
    cache_for::<T>().get_or_build(sequence, make)
}
