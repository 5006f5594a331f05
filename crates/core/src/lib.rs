//! The nested-set dependency-aggregation engine used throughout a polyglot
//! build system to represent transitively-aggregated sets: compile-time
//! classpaths, link-time libraries, transitive source files, transitive
//! labels, and similar aggregations over a build graph.
//!
//! A build-graph node typically references sets produced by every one of
//! its dependencies, so the central design constraint is sharing: a
//! [`NestedSet`] is an immutable, reference-counted DAG node that can be
//! composed into further sets without ever being copied or flattened, and
//! flattening (via [`NestedSet::to_list`]) only runs when a consumer
//! actually needs the materialized, duplicate-free sequence.
//!
//! # Building and reading a set
//!
//! ```
//! use depset::{NestedSetBuilder, Order};
//!
//! let mut deps = NestedSetBuilder::new(Order::Compile);
//! deps.add("a.o".to_string());
//! let built = deps.build();
//! assert_eq!(built.to_list().unwrap(), vec!["a.o".to_string()]);
//! ```
//!
//! # Components
//!
//! - [`Order`] -- the four traversal orders (`Stable`, `Compile`, `Link`,
//!   `NaiveLink`) and their compatibility rule.
//! - [`NestedSet`] -- the immutable set itself; owns the flattening
//!   algorithms and optional async-resolved contents.
//! - [`NestedSetBuilder`] -- the mutable accumulator that produces a
//!   [`NestedSet`].
//! - [`Extrema`] -- a bounded top-k/bottom-k aggregator, used alongside
//!   nested sets by query engines built on top of this crate.
//! - [`Uniquifier`] -- a thread-safe monotone dedup filter for parallel
//!   graph visitors.
//!
//! # Scope
//!
//! This crate is the in-memory aggregation engine only. It has no
//! persistence format, no network protocol, and no concurrency scheduler of
//! its own -- it is a library called from many threads owned by its
//! callers (the build CLI, the rule evaluator, the query engine, and so
//! on), none of which are implemented here.
#![warn(missing_docs)]

mod builder;
mod error;
mod extrema;
mod order;
mod registry;
mod set;
mod uniquifier;
mod wrap_cache;

pub use builder::NestedSetBuilder;
pub use error::Error;
pub use extrema::Extrema;
pub use order::Order;
pub use set::{AsyncContents, NestedSet};
pub use uniquifier::Uniquifier;
