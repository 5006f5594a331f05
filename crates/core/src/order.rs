//! Traversal orders and their compatibility rules.
//!
//! `Order` is a closed, four-variant enumeration rather than an open-ended
//! trait: the flattening loop in [`crate::set`] branches on the tag once per
//! call and the compiler specializes each arm, instead of paying for dynamic
//! dispatch on every node of a DAG that can have millions of nodes shared
//! across a large build graph.
use std::fmt;
use std::sync::Arc;

use crate::registry;
use crate::set::NestedSet;

/// The rule governing how a [`NestedSet`] DAG is flattened into a linear,
/// duplicate-free sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// No ordering guarantee beyond "each element appears once".
    Stable,
    /// Post-order: transitive sub-sets first (in the order they were added),
    /// then the node's own direct members (in the order they were added).
    Compile,
    /// Reversed post-order, tuned for link-line layouts: a dependent's
    /// direct members win their slot over a dependency's, on first
    /// occurrence counted from the end of the intended link line.
    Link,
    /// Pre-order: a node's own direct members first, then its transitive
    /// sub-sets, in the order both were added.
    NaiveLink,
}

impl Order {
    /// Returns the process-wide empty singleton [`NestedSet`] of this order.
    ///
    /// Per the collapsing invariant, any builder of this order that ends up
    /// with no direct members and no non-empty transitives must return
    /// exactly this value (same allocation, not merely an equal one).
    #[must_use]
    pub fn empty_set<T>(self) -> NestedSet<T>
    where
        T: Send + Sync + 'static,
    {
        let singleton = registry::get_or_insert_with(self, || Arc::new(NestedSet::new_empty(self)));
        NestedSet::clone(&singleton)
    }

    /// `true` iff a set of order `other` may be added as a transitive to a
    /// builder of order `self`. The relation is commutative: `Stable` is
    /// compatible with every order, and every non-`Stable` order is
    /// compatible only with `Stable` and itself.
    #[must_use]
    pub const fn is_compatible(self, other: Self) -> bool {
        matches!(self, Self::Stable) || matches!(other, Self::Stable) || self.same_variant(other)
    }

    const fn same_variant(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Stable, Self::Stable)
                | (Self::Compile, Self::Compile)
                | (Self::Link, Self::Link)
                | (Self::NaiveLink, Self::NaiveLink)
        )
    }

    /// A short diagnostic name, used only in [`crate::error::Error::OrderMismatch`]
    /// messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Compile => "compile",
            Self::Link => "link",
            Self::NaiveLink => "naive_link",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
