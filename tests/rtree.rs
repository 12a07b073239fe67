// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use approx::assert_relative_eq;
use rtree::geometry::{Point, Rect};
use rtree::{Config, Entry, RTree};

fn init_logging() {
    let _ = env_logger::try_init();
}

fn small_square() -> RTree<&'static str> {
    let t = RTree::new();
    let t = t.insert(Point::new(0.0, 0.0), "a");
    let t = t.insert(Point::new(1.0, 0.0), "b");
    let t = t.insert(Point::new(0.0, 1.0), "c");
    let t = t.insert(Point::new(1.0, 1.0), "d");
    t.insert(Point::new(2.0, 2.0), "e")
}

#[test]
fn search_window_excludes_the_outlier() {
    let tree = small_square();
    let mut found: Vec<&'static str> = tree
        .search(&Rect::new(0.0, 0.0, 1.0, 1.0))
        .into_iter()
        .map(|e| e.value)
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec!["a", "b", "c", "d"]);
}

#[test]
fn nearest_finds_the_closest_corner() {
    let tree = small_square();
    let found = tree.nearest(&Point::new(0.1, 0.1)).unwrap();
    assert_eq!(found.value, "a");
    assert_relative_eq!(
        found.pt.distance(&Point::new(0.1, 0.1)),
        0.1414,
        epsilon = 0.01
    );
}

fn line_of_ten() -> RTree<usize> {
    let config = Config::new().with_max_entries(4).with_seed(1);
    let mut tree = RTree::with_config(config);
    for i in 0..=9 {
        tree = tree.insert(Point::new(i as f32, 0.0), i);
    }
    tree
}

#[test]
fn overflow_grows_a_balanced_second_level() {
    init_logging();
    let tree = line_of_ten();
    assert_eq!(tree.len(), 10);
    assert_eq!(tree.rect(), Rect::new(0.0, 0.0, 9.0, 0.0));
    assert_eq!(tree.entries().len(), 10);
}

#[test]
fn removing_every_entry_in_insertion_order_empties_the_tree() {
    init_logging();
    let mut tree = line_of_ten();
    for i in 0..=9 {
        let entry = Entry::new(Point::new(i as f32, 0.0), i);
        tree = tree.remove(&entry).expect("entry was inserted above");
        assert_eq!(tree.len(), 9 - i);
        assert_eq!(tree.count(&Rect::new(-1000.0, -1000.0, 1000.0, 1000.0)), tree.len());
    }
    assert!(tree.is_empty());
}

#[test]
fn nearest_k_returns_the_k_closest_in_order() {
    let tree = line_of_ten();
    let found = tree.nearest_k(&Point::new(5.0, 0.0), 3);
    let mut values: Vec<usize> = found.iter().map(|e| e.value).collect();
    values.sort_unstable();
    assert_eq!(values, vec![4, 5, 6]);
}

#[test]
fn count_on_a_non_finite_space_is_zero() {
    let tree = line_of_ten();
    assert_eq!(tree.count(&Rect::EMPTY), 0);
    assert_eq!(tree.count(&Rect::new(0.0, 0.0, 9.0, 0.0)), 10);
}

#[test]
fn remove_absent_entry_returns_none_without_touching_the_tree() {
    let tree = small_square();
    let absent = Entry::new(Point::new(99.0, 99.0), "z");
    assert!(tree.remove(&absent).is_none());
    assert_eq!(tree.len(), 5);
}
