//! A thread-safe, monotone "seen before" filter for parallel graph visitors.
use std::hash::Hash;

use dashmap::DashSet;

/// Declares each distinct element "first time seen" at most once, across any
/// number of threads.
///
/// Backed by a concurrent hash set with atomic insert-if-absent
/// (`dashmap::DashSet`), so `unique_one` is race-free: for any element,
/// across any interleaving of calls from any number of threads, exactly one
/// call observes `true`.
pub struct Uniquifier<T> {
    seen: DashSet<T>,
}

impl<T> Default for Uniquifier<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Uniquifier<T>
where
    T: Eq + Hash + Clone,
{
    /// An empty uniquifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// `true` iff `candidate` had not been observed by this uniquifier
    /// before (by any thread). Once an element has been declared "not
    /// unique", it remains so forever.
    pub fn unique_one(&self, candidate: T) -> bool {
        self.seen.insert(candidate)
    }

    /// Filters `candidates`, in order, to only those not previously
    /// observed (by any thread, including earlier elements of this same
    /// call).
    pub fn unique<I>(&self, candidates: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.seen.insert(candidate.clone()))
            .collect()
    }

    /// The number of distinct elements observed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// `true` iff nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
