//! End-to-end flattening scenarios, exercised through the public API only.
use std::sync::Arc;

use depset::{Error, NestedSetBuilder, Order};

fn leaf(order: Order, directs: &[&str]) -> depset::NestedSet<String> {
    let mut builder = NestedSetBuilder::new(order);
    builder.add_all(directs.iter().map(|s| (*s).to_string()));
    builder.build()
}

#[test]
fn compile_order_flattens_dependencies_before_the_dependent() {
    let b1b2 = leaf(Order::Compile, &["b1", "b2"]);
    let c1c2 = leaf(Order::Compile, &["c1", "c2"]);

    let mut root = NestedSetBuilder::new(Order::Compile);
    root.add_transitive(b1b2).unwrap();
    root.add_transitive(c1c2).unwrap();
    root.add("a".to_string());

    let flattened = root.build().to_list().unwrap();
    assert_eq!(flattened, vec!["b1", "b2", "c1", "c2", "a"]);
}

#[test]
fn naive_link_order_flattens_the_dependent_before_its_dependencies() {
    let b1b2 = leaf(Order::NaiveLink, &["b1", "b2"]);
    let c1c2 = leaf(Order::NaiveLink, &["c1", "c2"]);

    let mut root = NestedSetBuilder::new(Order::NaiveLink);
    root.add("a".to_string());
    root.add_transitive(b1b2).unwrap();
    root.add_transitive(c1c2).unwrap();

    let flattened = root.build().to_list().unwrap();
    assert_eq!(flattened, vec!["a", "b1", "b2", "c1", "c2"]);
}

#[test]
fn link_order_resolves_a_diamond_dependency_to_one_occurrence() {
    // z depends on y and x directly; y also depends on x.
    let x = leaf(Order::Link, &["x"]);

    let mut y_builder = NestedSetBuilder::new(Order::Link);
    y_builder.add("y".to_string());
    y_builder.add_transitive(x.clone()).unwrap();
    let y = y_builder.build();

    let mut z_builder = NestedSetBuilder::new(Order::Link);
    z_builder.add("z".to_string());
    z_builder.add_transitive(x).unwrap();
    z_builder.add_transitive(y).unwrap();
    let z = z_builder.build();

    assert_eq!(z.to_list().unwrap(), vec!["z", "y", "x"]);
}

#[test]
fn stable_order_only_guarantees_one_occurrence_per_element() {
    let mut builder = NestedSetBuilder::new(Order::Stable);
    builder.add_all([1, 2, 3, 2, 1]);
    let flattened = builder.build().to_list().unwrap();
    assert_eq!(flattened.iter().collect::<std::collections::HashSet<_>>().len(), 3);
    assert_eq!(flattened.len(), 3);
}

#[test]
fn incompatible_orders_are_rejected_at_composition_time() {
    let compile_set: depset::NestedSet<String> = leaf(Order::Compile, &["a"]);
    let mut link_builder = NestedSetBuilder::new(Order::Link);
    let err = link_builder.add_transitive(compile_set).unwrap_err();
    assert!(matches!(err, Error::OrderMismatch { builder: Order::Link, added: Order::Compile }));
}

#[test]
fn a_builder_with_a_single_transitive_and_no_directs_collapses_to_it() {
    let inner = leaf(Order::Stable, &["only"]);
    let mut outer = NestedSetBuilder::new(Order::Stable);
    outer.add_transitive(inner.clone()).unwrap();
    assert!(outer.build().shallow_equals(&inner));
}

#[test]
fn empty_sets_of_the_same_order_are_the_same_allocation_everywhere() {
    let a: depset::NestedSet<String> = NestedSetBuilder::new(Order::Compile).build();
    let b = Order::Compile.empty_set::<String>();
    assert!(a.shallow_equals(&b));
}

#[test]
fn wrapping_the_same_arc_slice_twice_under_stable_shares_identity() {
    let sequence: Arc<[i32]> = Arc::from(vec![10, 20, 30].into_boxed_slice());
    let first = NestedSetBuilder::wrap(Order::Stable, sequence.clone());
    let second = NestedSetBuilder::wrap(Order::Stable, sequence);
    assert!(first.shallow_equals(&second));
    assert_eq!(first.to_list().unwrap(), vec![10, 20, 30]);
}

#[test]
fn deeply_shared_sub_dag_is_only_ever_visited_once_per_flatten() {
    // A wide fan-in: many parents share the very same leaf transitive.
    let shared = leaf(Order::Compile, &["shared"]);
    let mut top = NestedSetBuilder::new(Order::Compile);
    for i in 0..50 {
        let mut parent = NestedSetBuilder::new(Order::Compile);
        parent.add_transitive(shared.clone()).unwrap();
        parent.add(format!("leaf-{i}"));
        top.add_transitive(parent.build()).unwrap();
    }
    let flattened = top.build().to_list().unwrap();
    assert_eq!(flattened.iter().filter(|e| *e == "shared").count(), 1);
    assert_eq!(flattened.len(), 51);
}
