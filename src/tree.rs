// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The persistent R-tree itself: every mutating operation returns a new
//! version, sharing untouched structure with the old one via `Rc`.

use std::rc::Rc;

use log::trace;

use crate::config::Config;
use crate::entry::Entry;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::node::{InsertResult, Node, NodeIter, RemoveResult};
use crate::query;

/// A persistent, structurally-shared 2-D R-tree mapping points to values.
///
/// Every insert or remove returns a new `RTree`; the previous version
/// remains valid and untouched, sharing any subtree neither call modified.
#[derive(Debug, Clone)]
pub struct RTree<T> {
    root: Rc<Node<T>>,
    config: Config,
    len: usize,
}

impl<T> Default for RTree<T> {
    fn default() -> RTree<T> {
        RTree::new()
    }
}

impl<T: Clone + PartialEq> RTree<T> {
    pub fn new() -> RTree<T> {
        RTree::with_config(Config::default())
    }

    pub fn with_max_entries(max_entries: usize) -> RTree<T> {
        RTree::with_config(Config::new().with_max_entries(max_entries))
    }

    pub fn with_config(config: Config) -> RTree<T> {
        RTree {
            root: Rc::new(Node::empty_leaf()),
            config,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn rect(&self) -> Rect {
        *self.root.rect()
    }

    pub fn insert(&self, pt: Point, value: T) -> RTree<T> {
        self.insert_entry(Entry::new(pt, value))
    }

    fn insert_entry(&self, entry: Entry<T>) -> RTree<T> {
        let mut rng = self.config.new_rng();
        let new_root = match self.root.insert(&entry, self.config.max_entries(), &mut rng) {
            InsertResult::Replacement(node) => node,
            InsertResult::Split(parts) => {
                trace!("root split into {} parts, growing a level", parts.len());
                let rect = parts.iter().fold(Rect::EMPTY, |acc, p| acc.expand(p.rect()));
                Rc::new(Node::Branch { children: parts, rect })
            }
        };
        RTree {
            root: new_root,
            config: self.config.clone(),
            len: self.len + 1,
        }
    }

    /// Removes `entry` and returns the new tree version, or `None` if it
    /// wasn't present. Orphans produced by cascading underflow are
    /// reinserted before the new version is returned, so every returned
    /// tree's invariants hold immediately.
    pub fn remove(&self, entry: &Entry<T>) -> Option<RTree<T>> {
        match self.root.remove(entry) {
            RemoveResult::NotFound => None,
            RemoveResult::Removed(orphans, replacement) => {
                let new_root = replacement.unwrap_or_else(|| Rc::new(Node::empty_leaf()));
                let mut tree = RTree {
                    root: new_root,
                    config: self.config.clone(),
                    len: self.len - 1,
                };
                if !orphans.is_empty() {
                    trace!("reinserting {} orphaned entries after removal", orphans.len());
                    for orphan in orphans {
                        tree = tree.insert_entry(orphan);
                        tree.len -= 1;
                    }
                }
                Some(tree)
            }
        }
    }

    pub fn search(&self, space: &Rect) -> Vec<Entry<T>> {
        query::search(&self.root, space)
    }

    pub fn count(&self, space: &Rect) -> usize {
        query::count(&self.root, space)
    }

    pub fn contains(&self, entry: &Entry<T>) -> bool {
        query::contains(&self.root, entry)
    }

    pub fn nearest(&self, pt: &Point) -> Option<Entry<T>> {
        query::nearest(&self.root, pt, f32::INFINITY)
    }

    pub fn nearest_k(&self, pt: &Point, k: usize) -> Vec<Entry<T>> {
        query::nearest_k(&self.root, pt, k, f32::INFINITY)
    }

    pub fn entries(&self) -> Vec<Entry<T>> {
        self.root.entries()
    }

    pub fn iter(&self) -> NodeIter<'_, T> {
        self.root.iter()
    }

    pub fn pretty(&self) -> String {
        self.root.pretty()
    }
}
