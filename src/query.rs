// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Read-only queries: window search, cardinality, and nearest-neighbor.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::entry::Entry;
use crate::geometry::{Point, Rect};
use crate::node::Node;

pub fn search<T: Clone>(node: &Node<T>, space: &Rect) -> Vec<Entry<T>> {
    let mut out = Vec::new();
    if space.is_finite() {
        search_into(node, space, &mut out);
    }
    out
}

fn search_into<T: Clone>(node: &Node<T>, space: &Rect, out: &mut Vec<Entry<T>>) {
    if !space.intersects(node.rect()) {
        return;
    }
    match node {
        Node::Leaf { entries, .. } => {
            out.extend(entries.iter().filter(|e| space.contains(&e.pt)).cloned());
        }
        Node::Branch { children, .. } => {
            for child in children {
                search_into(child, space, out);
            }
        }
    }
}

pub fn count<T>(node: &Node<T>, space: &Rect) -> usize {
    if !space.is_finite() {
        return 0;
    }
    count_into(node, space)
}

fn count_into<T>(node: &Node<T>, space: &Rect) -> usize {
    if !space.intersects(node.rect()) {
        return 0;
    }
    match node {
        Node::Leaf { entries, .. } => entries.iter().filter(|e| space.contains(&e.pt)).count(),
        Node::Branch { children, .. } => children.iter().map(|c| count_into(c, space)).sum(),
    }
}

pub fn contains<T: Clone + PartialEq>(node: &Node<T>, entry: &Entry<T>) -> bool {
    search(node, &entry.pt.to_box()).iter().any(|e| e == entry)
}

pub fn nearest<T: Clone>(node: &Node<T>, pt: &Point, d0: f32) -> Option<Entry<T>> {
    let mut best: Option<Entry<T>> = None;
    let mut best_dist = d0;
    nearest_rec(node, pt, &mut best, &mut best_dist);
    best
}

fn nearest_rec<T: Clone>(node: &Node<T>, pt: &Point, best: &mut Option<Entry<T>>, best_dist: &mut f32) {
    if node.rect().distance(pt) >= *best_dist {
        return;
    }
    match node {
        Node::Leaf { entries, .. } => {
            for entry in entries {
                let d = entry.pt.distance(pt);
                if d < *best_dist {
                    *best_dist = d;
                    *best = Some(entry.clone());
                }
            }
        }
        Node::Branch { children, .. } => {
            let mut ordered: Vec<&std::rc::Rc<Node<T>>> = children.iter().collect();
            ordered.sort_by_key(|c| OrderedFloat(c.rect().distance(pt)));
            for child in ordered {
                nearest_rec(child, pt, best, best_dist);
            }
        }
    }
}

/// Max-heap element ordered purely by distance, for bounding the k-nearest
/// search to the k best candidates seen so far.
struct HeapItem<T> {
    dist: OrderedFloat<f32>,
    entry: Entry<T>,
}

impl<T> PartialEq for HeapItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl<T> Eq for HeapItem<T> {}

impl<T> PartialOrd for HeapItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for HeapItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

pub fn nearest_k<T: Clone>(node: &Node<T>, pt: &Point, k: usize, d0: f32) -> Vec<Entry<T>> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<HeapItem<T>> = BinaryHeap::with_capacity(k + 1);
    let mut bound = d0;
    nearest_k_rec(node, pt, k, &mut heap, &mut bound);

    let mut found: Vec<HeapItem<T>> = heap.into_vec();
    found.sort_by_key(|item| item.dist);
    found.into_iter().map(|item| item.entry).collect()
}

fn nearest_k_rec<T: Clone>(
    node: &Node<T>,
    pt: &Point,
    k: usize,
    heap: &mut BinaryHeap<HeapItem<T>>,
    bound: &mut f32,
) {
    if node.rect().distance(pt) >= *bound {
        return;
    }
    match node {
        Node::Leaf { entries, .. } => {
            for entry in entries {
                let d = entry.pt.distance(pt);
                if d >= *bound {
                    continue;
                }
                heap.push(HeapItem {
                    dist: OrderedFloat(d),
                    entry: entry.clone(),
                });
                if heap.len() > k {
                    heap.pop();
                }
                if heap.len() == k {
                    *bound = heap.peek().unwrap().dist.into_inner();
                }
            }
        }
        Node::Branch { children, .. } => {
            let mut ordered: Vec<&std::rc::Rc<Node<T>>> = children.iter().collect();
            ordered.sort_by_key(|c| OrderedFloat(c.rect().distance(pt)));
            for child in ordered {
                nearest_k_rec(child, pt, k, heap, bound);
            }
        }
    }
}
