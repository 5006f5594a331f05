//! The error taxonomy a [`crate::builder::NestedSetBuilder`] and
//! [`crate::set::NestedSet`] can raise.
//!
//! All three kinds are fatal at the call site: callers are expected to treat
//! them as programming errors, not conditions to retry or recover from. The
//! core never logs an error body itself (see the crate-level docs on
//! logging) -- it only surfaces one, verbatim, to the caller of the
//! operation that triggered it.
use std::sync::Arc;

use crate::order::Order;

/// A failure raised by the nested-set engine.
///
/// `Cycle` is deliberately absent from this enum: acyclicity is a structural
/// precondition of the builder API (sub-sets are only ever reachable through
/// already-built, already-acyclic [`crate::set::NestedSet`] values), so the
/// core has no code path that could observe one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// `add_transitive` was called with a set whose order is incompatible
    /// with the builder's own order.
    #[error("cannot add a transitive of order `{added}` to a builder of order `{builder}`")]
    OrderMismatch {
        /// The order of the builder the caller invoked `add_transitive` on.
        builder: Order,
        /// The order of the transitive set that was rejected.
        added: Order,
    },

    /// A null/absent element was passed to `add`/`add_all`.
    ///
    /// Rust's non-nullable value types make this structurally unreachable
    /// from safe code for ordinary element types; the variant is kept so
    /// that callers building `NestedSet<Option<T>>` or similar nullable
    /// element types over FFI boundaries still have a distinguishable error
    /// kind to match on.
    #[error("attempted to add a null element to a nested-set builder")]
    NullElement,

    /// The producer backing an async-backed [`crate::set::NestedSet`]
    /// rejected. The inner error is the producer's failure, forwarded
    /// unchanged; the core does not interpret it.
    #[error("async-backed nested set failed to resolve: {0}")]
    AsyncBackingFailed(#[source] Arc<dyn std::error::Error + Send + Sync>),
}
