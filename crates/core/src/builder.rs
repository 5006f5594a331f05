//! The mutable accumulator used to construct a [`NestedSet`].
use std::hash::Hash;

use crate::error::Error;
use crate::order::Order;
use crate::set::NestedSet;
use crate::wrap_cache;

/// Accumulates direct members and transitive sub-sets for one order, then
/// emits an immutable [`NestedSet`] via [`Self::build`].
///
/// Not thread-safe: each thread owns its own builder and publishes the
/// `build()` result (an `Arc`-backed, `Send + Sync` value) to other
/// threads, rather than sharing the builder itself.
pub struct NestedSetBuilder<T> {
    order: Order,
    directs: Vec<T>,
    transitives: Vec<NestedSet<T>>,
}

impl<T> NestedSetBuilder<T> {
    /// An empty builder of the given order.
    #[must_use]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            directs: Vec::new(),
            transitives: Vec::new(),
        }
    }

    /// Appends `element` to the direct members, in insertion order.
    ///
    /// Infallible: Rust's non-nullable value types make
    /// [`Error::NullElement`] structurally unreachable for this method (see
    /// that variant's docs for the nullable-element escape hatch).
    pub fn add(&mut self, element: T) -> &mut Self {
        self.directs.push(element);
        self
    }

    /// Appends every element of `elements`, in iteration order.
    pub fn add_all<I>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        self.directs.extend(elements);
        self
    }

    /// Appends `set` to the transitive references, in insertion order.
    ///
    /// An empty transitive is dropped silently -- callers build sets
    /// compositionally, and suppressing empties here keeps deep compositions
    /// from growing trees of empty nodes and lets [`Self::is_empty`] and
    /// order-compatibility checks run over non-empty content only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderMismatch`] if `set`'s order is not compatible
    /// with this builder's order (see [`Order::is_compatible`]).
    pub fn add_transitive(&mut self, set: NestedSet<T>) -> Result<&mut Self, Error>
    where
        T: Clone,
    {
        if !self.order.is_compatible(set.order()) {
            return Err(Error::OrderMismatch {
                builder: self.order,
                added: set.order(),
            });
        }
        if !set.is_empty()? {
            self.transitives.push(set);
        }
        Ok(self)
    }

    /// `true` iff neither a direct member nor a non-empty transitive has
    /// been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directs.is_empty() && self.transitives.is_empty()
    }

    /// Builds an immutable [`NestedSet`] from the accumulated contents.
    ///
    /// May be called more than once, and may be followed by further `add`/
    /// `add_transitive` calls -- each call produces an independent snapshot.
    /// Honors two invariants:
    ///
    /// - if nothing (or only already-dropped empty transitives) was added,
    ///   returns the order's process-wide empty singleton, by identity;
    /// - if exactly one transitive of this order was added and no direct
    ///   members were, returns that transitive itself (the collapsing
    ///   invariant), by identity, instead of wrapping it in a new node.
    #[must_use]
    pub fn build(&self) -> NestedSet<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.directs.is_empty() {
            if self.transitives.is_empty() {
                tracing::trace!(order = %self.order, "building empty nested set");
                return self.order.empty_set();
            }
            if self.transitives.len() == 1 {
                tracing::trace!(order = %self.order, "collapsing single-transitive nested set");
                return self.transitives[0].clone();
            }
        }
        tracing::trace!(
            order = %self.order,
            directs = self.directs.len(),
            transitives = self.transitives.len(),
            "building nested set",
        );
        NestedSet::new_eager(self.order, self.directs.clone(), self.transitives.clone())
    }
}

impl<T> NestedSetBuilder<T>
where
    T: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Wraps an externally-provided, already-ordered sequence as a
    /// [`NestedSet`].
    ///
    /// If `sequence` has length 0 or 1, returns the corresponding empty or
    /// single-element singleton directly. Otherwise, under `Order::Stable`
    /// only, consults a process-wide weak-keyed cache keyed by the identity
    /// of `sequence`'s allocation: repeated calls with the same `Arc<[T]>`
    /// return the same `NestedSet`. Any other order always builds fresh,
    /// since identity sharing across non-`Stable` wraps is not part of the
    /// contract.
    #[must_use]
    pub fn wrap(order: Order, sequence: std::sync::Arc<[T]>) -> NestedSet<T> {
        if sequence.is_empty() {
            return order.empty_set();
        }
        if sequence.len() == 1 {
            let mut b = Self::new(order);
            b.add(sequence[0].clone());
            return b.build();
        }
        if order != Order::Stable {
            let mut b = Self::new(order);
            b.add_all(sequence.iter().cloned());
            return b.build();
        }
        wrap_cache::get_or_build(&sequence, || {
            let mut b = Self::new(Order::Stable);
            b.add_all(sequence.iter().cloned());
            b.build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_returns_the_empty_singleton() {
        let b: NestedSetBuilder<String> = NestedSetBuilder::new(Order::Compile);
        let built = b.build();
        assert!(built.shallow_equals(&Order::Compile.empty_set()));
    }

    #[test]
    fn builder_with_only_empty_transitives_is_empty() {
        let empty: NestedSet<String> = Order::Compile.empty_set();
        let mut b = NestedSetBuilder::new(Order::Compile);
        b.add_transitive(empty).unwrap();
        assert!(b.is_empty());
        assert!(b.build().shallow_equals(&Order::Compile.empty_set()));
    }

    #[test]
    fn single_transitive_collapses_to_identity() {
        let mut inner_builder = NestedSetBuilder::new(Order::Link);
        inner_builder.add("x".to_string());
        let inner = inner_builder.build();

        let mut outer_builder = NestedSetBuilder::new(Order::Link);
        outer_builder.add_transitive(inner.clone()).unwrap();
        let outer = outer_builder.build();

        assert!(outer.shallow_equals(&inner));
        assert_eq!(outer.shallow_hash(), inner.shallow_hash());
    }

    #[test]
    fn incompatible_transitive_order_is_rejected() {
        let link_set: NestedSet<String> = NestedSetBuilder::new(Order::Link).build();
        let mut compile_builder = NestedSetBuilder::new(Order::Compile);
        let err = compile_builder.add_transitive(link_set).unwrap_err();
        match err {
            Error::OrderMismatch { builder, added } => {
                assert_eq!(builder, Order::Compile);
                assert_eq!(added, Order::Link);
            }
            other => panic!("expected OrderMismatch, got {other:?}"),
        }
    }

    #[test]
    fn compatible_transitive_order_is_accepted() {
        let stable_set: NestedSet<String> = {
            let mut b = NestedSetBuilder::new(Order::Stable);
            b.add("x".to_string());
            b.build()
        };
        let mut compile_builder = NestedSetBuilder::new(Order::Compile);
        assert!(compile_builder.add_transitive(stable_set).is_ok());
    }

    #[test]
    fn wrap_cache_returns_identical_set_for_the_same_sequence() {
        let seq: std::sync::Arc<[i32]> = std::sync::Arc::from(vec![1, 2, 3].into_boxed_slice());
        let a = NestedSetBuilder::wrap(Order::Stable, seq.clone());
        let b = NestedSetBuilder::wrap(Order::Stable, seq);
        assert!(a.shallow_equals(&b));
    }

    #[test]
    fn wrap_under_non_stable_order_never_shares_identity() {
        let seq: std::sync::Arc<[i32]> = std::sync::Arc::from(vec![1, 2, 3].into_boxed_slice());
        let a = NestedSetBuilder::wrap(Order::Compile, seq.clone());
        let b = NestedSetBuilder::wrap(Order::Compile, seq);
        assert!(!a.shallow_equals(&b));
    }

    #[test]
    fn wrap_of_singleton_sequence_returns_singleton_shape() {
        let seq: std::sync::Arc<[i32]> = std::sync::Arc::from(vec![42].into_boxed_slice());
        let wrapped = NestedSetBuilder::wrap(Order::Stable, seq);
        assert_eq!(wrapped.to_list().unwrap(), vec![42]);
    }
}
