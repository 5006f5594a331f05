//! The immutable, shareable `NestedSet` and its flattening algorithms.
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use hashbrown::HashSet;
use once_cell::sync::OnceCell;

use crate::error::Error;
use crate::order::Order;

/// An async producer for the contents of an async-backed `NestedSet`: a
/// boxed future resolving to the flat, ordered element sequence, or an
/// error the core forwards verbatim.
pub type AsyncContents<T> =
    Pin<Box<dyn Future<Output = Result<Vec<T>, Arc<dyn std::error::Error + Send + Sync>>> + Send>>;

enum Contents<T> {
    Eager {
        directs: Vec<T>,
        transitives: Vec<NestedSet<T>>,
    },
    Async {
        // Taken exactly once by whichever thread wins `resolved.get_or_init`.
        producer: Mutex<Option<AsyncContents<T>>>,
        resolved: OnceCell<Result<Arc<[T]>, Arc<dyn std::error::Error + Send + Sync>>>,
    },
}

struct Inner<T> {
    order: Order,
    contents: Contents<T>,
}

/// An immutable, recursively-composed, reference-counted set: a node's
/// direct members plus references to other `NestedSet` values whose
/// elements are considered transitively part of this set.
///
/// Cloning a `NestedSet` is cheap (an `Arc` bump); there are no cycles in
/// the sub-set DAG, so reference counting alone reclaims memory -- no
/// cycle collector is needed. Two `NestedSet` values are never mutated in
/// place; every operation that "changes" a set instead produces a new one
/// through [`crate::builder::NestedSetBuilder`].
pub struct NestedSet<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for NestedSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for NestedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.contents {
            Contents::Eager {
                directs,
                transitives,
            } => f
                .debug_struct("NestedSet")
                .field("order", &self.inner.order)
                .field("directs", &directs.len())
                .field("transitives", &transitives.len())
                .finish(),
            Contents::Async { .. } => f
                .debug_struct("NestedSet")
                .field("order", &self.inner.order)
                .field("async", &true)
                .finish(),
        }
    }
}

impl<T> NestedSet<T> {
    /// Builds a fresh eager set. Not exposed directly -- callers go through
    /// [`crate::builder::NestedSetBuilder`] or [`Order::empty_set`], both of
    /// which maintain the invariants (empty singleton identity, collapsing)
    /// this constructor itself does not enforce.
    pub(crate) fn new_eager(order: Order, directs: Vec<T>, transitives: Vec<Self>) -> Self {
        Self {
            inner: Arc::new(Inner {
                order,
                contents: Contents::Eager {
                    directs,
                    transitives,
                },
            }),
        }
    }

    pub(crate) fn new_empty(order: Order) -> Self {
        Self::new_eager(order, Vec::new(), Vec::new())
    }

    /// Builds a set backed by an asynchronous producer instead of eager
    /// direct/transitive storage. Used to support streaming deserialization:
    /// nothing reads the producer until something calls [`Self::to_list`],
    /// [`Self::iter`], or [`Self::is_empty`] on this set.
    #[must_use]
    pub fn new_async(order: Order, producer: AsyncContents<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                order,
                contents: Contents::Async {
                    producer: Mutex::new(Some(producer)),
                    resolved: OnceCell::new(),
                },
            }),
        }
    }

    /// The order this set flattens under.
    #[must_use]
    pub fn order(&self) -> Order {
        self.inner.order
    }

    /// Structural identity per the shallow-equality contract: two sets are
    /// equal iff they are literally the same allocation. Two sets with
    /// identical flattened contents are *not* required to compare equal --
    /// only sets that trace back to the same builder `build()` call (or the
    /// same empty/collapsed singleton, or the same async producer) do.
    #[must_use]
    pub fn shallow_equals(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A hash consistent with [`Self::shallow_equals`]: the address of the
    /// underlying allocation.
    #[must_use]
    pub fn shallow_hash(&self) -> u64 {
        Arc::as_ptr(&self.inner) as *const () as u64
    }

    fn node_key(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    fn resolve_async(&self) -> Result<Arc<[T]>, Error>
    where
        T: Clone,
    {
        let Contents::Async { producer, resolved } = &self.inner.contents else {
            unreachable!("resolve_async called on an eager set");
        };
        let outcome = resolved.get_or_init(|| {
            let fut = producer
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .take()
                .expect("async producer already taken by a prior resolution");
            tracing::debug!("blocking on async nested-set producer");
            match futures::executor::block_on(fut) {
                Ok(items) => Ok(Arc::from(items.into_boxed_slice())),
                Err(err) => Err(err),
            }
        });
        match outcome {
            Ok(items) => Ok(Arc::clone(items)),
            Err(err) => Err(Error::AsyncBackingFailed(Arc::clone(err))),
        }
    }

    /// `true` iff flattening this set would produce an empty sequence.
    ///
    /// O(1) for eager sets (the builder never retains empty transitives, so
    /// an eager node with no directs and no transitives is guaranteed
    /// empty). Blocks on the producer for async-backed sets, same as
    /// [`Self::to_list`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AsyncBackingFailed`] if this set is async-backed and
    /// its producer rejects.
    pub fn is_empty(&self) -> Result<bool, Error>
    where
        T: Clone,
    {
        match &self.inner.contents {
            Contents::Eager {
                directs,
                transitives,
            } => Ok(directs.is_empty() && transitives.is_empty()),
            Contents::Async { .. } => Ok(self.resolve_async()?.is_empty()),
        }
    }

    /// Flattens this set's DAG of sub-sets into an ordered, duplicate-free
    /// sequence, per the traversal rule of [`Self::order`].
    ///
    /// Restartable: each call re-traverses the DAG from scratch (beyond the
    /// one-time async resolution cache) and is idempotent -- repeated calls
    /// return element-wise-equal sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AsyncBackingFailed`] if any async-backed sub-set
    /// (this one, or a transitive of it) fails to resolve. Once a given
    /// async sub-set has failed, every subsequent call observes the same
    /// error.
    pub fn to_list(&self) -> Result<Vec<T>, Error>
    where
        T: Clone + Eq + Hash,
    {
        tracing::trace!(order = %self.order(), "flattening nested set");
        let mut visited_nodes = HashSet::new();
        let mut visited_values = HashSet::new();
        let mut out = Vec::new();
        match self.order() {
            Order::Stable | Order::NaiveLink => {
                self.flatten_preorder(false, &mut visited_nodes, &mut visited_values, &mut out)?;
            }
            Order::Link => {
                self.flatten_preorder(true, &mut visited_nodes, &mut visited_values, &mut out)?;
            }
            Order::Compile => {
                self.flatten_postorder(&mut visited_nodes, &mut visited_values, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Equivalent to `self.to_list()?.into_iter()`.
    ///
    /// # Errors
    ///
    /// See [`Self::to_list`].
    pub fn iter(&self) -> Result<std::vec::IntoIter<T>, Error>
    where
        T: Clone + Eq + Hash,
    {
        Ok(self.to_list()?.into_iter())
    }

    /// Pre-order traversal shared by `Stable`, `NaiveLink`, and `Link`: emit
    /// a node's own direct members before recursing into its transitives.
    /// `reverse_children` selects `Link`'s "reversed order added" rule;
    /// `Stable`/`NaiveLink` recurse in the order transitives were added.
    ///
    /// Node-level memoization (`visited_nodes`) skips an already-visited
    /// sub-set *entirely*, including re-emitting its direct members -- this
    /// is what makes `Link`'s behavior on a shared sub-DAG match "first
    /// occurrence wins, counted from the end of the intended link line"
    /// without a separate whole-sequence reversal pass.
    fn flatten_preorder(
        &self,
        reverse_children: bool,
        visited_nodes: &mut HashSet<usize>,
        visited_values: &mut HashSet<T>,
        out: &mut Vec<T>,
    ) -> Result<(), Error>
    where
        T: Clone + Eq + Hash,
    {
        if !visited_nodes.insert(self.node_key()) {
            return Ok(());
        }
        match &self.inner.contents {
            Contents::Eager {
                directs,
                transitives,
            } => {
                for element in directs {
                    if visited_values.insert(element.clone()) {
                        out.push(element.clone());
                    }
                }
                if reverse_children {
                    for transitive in transitives.iter().rev() {
                        transitive.flatten_preorder(
                            reverse_children,
                            visited_nodes,
                            visited_values,
                            out,
                        )?;
                    }
                } else {
                    for transitive in transitives {
                        transitive.flatten_preorder(
                            reverse_children,
                            visited_nodes,
                            visited_values,
                            out,
                        )?;
                    }
                }
            }
            Contents::Async { .. } => {
                for element in self.resolve_async()?.iter() {
                    if visited_values.insert(element.clone()) {
                        out.push(element.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Post-order traversal for `Compile`: recurse into transitives (in the
    /// order they were added) before emitting this node's own direct
    /// members.
    fn flatten_postorder(
        &self,
        visited_nodes: &mut HashSet<usize>,
        visited_values: &mut HashSet<T>,
        out: &mut Vec<T>,
    ) -> Result<(), Error>
    where
        T: Clone + Eq + Hash,
    {
        if !visited_nodes.insert(self.node_key()) {
            return Ok(());
        }
        match &self.inner.contents {
            Contents::Eager {
                directs,
                transitives,
            } => {
                for transitive in transitives {
                    transitive.flatten_postorder(visited_nodes, visited_values, out)?;
                }
                for element in directs {
                    if visited_values.insert(element.clone()) {
                        out.push(element.clone());
                    }
                }
            }
            Contents::Async { .. } => {
                for element in self.resolve_async()?.iter() {
                    if visited_values.insert(element.clone()) {
                        out.push(element.clone());
                    }
                }
            }
        }
        Ok(())
    }
}
