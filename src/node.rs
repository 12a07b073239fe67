// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The node algebra: `Leaf`/`Branch`, insertion, and removal.

use std::rc::Rc;

use log::trace;
use rand::Rng;

use crate::entry::Entry;
use crate::geometry::{Geometry, Point, Rect};
use crate::joined::Joined;
use crate::splitter;

/// Default cap on a node's child count before it splits.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Level node of a tree. Either holds entries directly (a leaf) or other
/// nodes (a branch). Immutable: insert/remove build new nodes, reusing
/// `Rc`-shared children that didn't change.
#[derive(Debug, Clone)]
pub enum Node<T> {
    Leaf {
        entries: Vec<Entry<T>>,
        rect: Rect,
    },
    Branch {
        children: Vec<Rc<Node<T>>>,
        rect: Rect,
    },
}

#[derive(Debug)]
#[must_use]
pub enum InsertResult<T> {
    Replacement(Rc<Node<T>>),
    Split(Vec<Rc<Node<T>>>),
}

#[derive(Debug)]
#[must_use]
pub enum RemoveResult<T> {
    NotFound,
    Removed(Joined<Entry<T>>, Option<Rc<Node<T>>>),
}

impl<T> Geometry for Rc<Node<T>> {
    fn bounding_rect(&self) -> Rect {
        *self.rect()
    }
}

impl<T: Clone + PartialEq> Node<T> {
    pub fn empty_leaf() -> Node<T> {
        Node::Leaf {
            entries: Vec::new(),
            rect: Rect::EMPTY,
        }
    }

    pub fn rect(&self) -> &Rect {
        match self {
            Node::Leaf { rect, .. } => rect,
            Node::Branch { rect, .. } => rect,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { entries, .. } => entries.len(),
            Node::Branch { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn branch_children(&self) -> Option<&[Rc<Node<T>>]> {
        match self {
            Node::Leaf { .. } => None,
            Node::Branch { children, .. } => Some(children),
        }
    }

    /// §4.1 contract: skip the O(n) box recompute when it provably can't shrink.
    fn contract(&self, gone: &Rect, regen: impl FnOnce() -> Rect) -> Rect {
        if self.rect().wraps(gone) {
            *self.rect()
        } else {
            regen()
        }
    }

    /// Every entry at or below this node, left to right.
    pub fn entries(&self) -> Vec<Entry<T>> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_entries(&mut out);
        out
    }

    fn collect_entries(&self, out: &mut Vec<Entry<T>>) {
        match self {
            Node::Leaf { entries, .. } => out.extend(entries.iter().cloned()),
            Node::Branch { children, .. } => {
                for child in children {
                    child.collect_entries(out);
                }
            }
        }
    }

    /// Lazy in-order traversal, restartable by calling `iter()` again.
    pub fn iter(&self) -> NodeIter<'_, T> {
        NodeIter::new(self)
    }

    /// Human-readable multi-line dump for diagnostics.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Node::Leaf { entries, rect } => {
                out.push_str(&format!("{pad}Leaf {:?} ({} entries)\n", rect, entries.len()));
                for e in entries {
                    out.push_str(&format!("{pad}  ({}, {})\n", e.pt.x, e.pt.y));
                }
            }
            Node::Branch { children, rect } => {
                out.push_str(&format!("{pad}Branch {:?} ({} children)\n", rect, children.len()));
                for child in children {
                    child.pretty_into(out, depth + 1);
                }
            }
        }
    }

    /// Choose the child needing the smallest `expand_area` to cover `pt`.
    /// Ties favor the lowest index.
    fn choose_subtree(children: &[Rc<Node<T>>], pt: &Point) -> usize {
        let target = pt.to_box();
        let mut best_idx = 0;
        let mut best_cost = f32::INFINITY;
        for (i, child) in children.iter().enumerate() {
            let cost = child.rect().expand_area(&target);
            if cost < best_cost {
                best_cost = cost;
                best_idx = i;
            }
        }
        best_idx
    }

    pub fn insert<R: Rng>(&self, entry: &Entry<T>, max_entries: usize, rng: &mut R) -> InsertResult<T> {
        match self {
            Node::Leaf { entries, rect } => {
                let mut new_entries = entries.clone();
                new_entries.push(entry.clone());
                let new_rect = rect.expand(&entry.pt.to_box());
                if new_entries.len() <= max_entries {
                    InsertResult::Replacement(Rc::new(Node::Leaf {
                        entries: new_entries,
                        rect: new_rect,
                    }))
                } else {
                    trace!("leaf overflowed at {} entries, splitting", new_entries.len());
                    let (a, b) = splitter::split_leaf(new_entries, rng);
                    InsertResult::Split(vec![Rc::new(a), Rc::new(b)])
                }
            }
            Node::Branch { children, rect } => {
                let idx = Self::choose_subtree(children, &entry.pt);
                match children[idx].insert(entry, max_entries, rng) {
                    InsertResult::Replacement(new_child) => {
                        let new_rect = rect.expand(new_child.rect());
                        let mut new_children = children.clone();
                        new_children[idx] = new_child;
                        InsertResult::Replacement(Rc::new(Node::Branch {
                            children: new_children,
                            rect: new_rect,
                        }))
                    }
                    InsertResult::Split(parts) => {
                        let mut new_children: Vec<Rc<Node<T>>> = children
                            .iter()
                            .enumerate()
                            .filter(|(i, _)| *i != idx)
                            .map(|(_, c)| Rc::clone(c))
                            .collect();
                        let mut new_rect = *rect;
                        for part in &parts {
                            new_rect = new_rect.expand(part.rect());
                            new_children.push(Rc::clone(part));
                        }
                        if new_children.len() <= max_entries {
                            InsertResult::Replacement(Rc::new(Node::Branch {
                                children: new_children,
                                rect: new_rect,
                            }))
                        } else {
                            trace!("branch overflowed at {} children, splitting", new_children.len());
                            let (a, b) = splitter::split_branch(new_children, rng);
                            InsertResult::Split(vec![Rc::new(a), Rc::new(b)])
                        }
                    }
                }
            }
        }
    }

    pub fn remove(&self, entry: &Entry<T>) -> RemoveResult<T> {
        match self {
            Node::Leaf { entries, rect } => {
                if !rect.contains(&entry.pt) {
                    return RemoveResult::NotFound;
                }
                let pos = match entries.iter().position(|e| e == entry) {
                    Some(p) => p,
                    None => return RemoveResult::NotFound,
                };
                if entries.len() == 1 {
                    return RemoveResult::Removed(Joined::empty(), None);
                }
                if entries.len() == 2 {
                    let survivor = entries[1 - pos].clone();
                    return RemoveResult::Removed(Joined::one(survivor), None);
                }
                let mut new_entries = entries.clone();
                let removed = new_entries.remove(pos);
                let new_rect = self.contract(&removed.pt.to_box(), || {
                    new_entries
                        .iter()
                        .fold(Rect::EMPTY, |r, e| r.expand(&e.pt.to_box()))
                });
                RemoveResult::Removed(
                    Joined::empty(),
                    Some(Rc::new(Node::Leaf {
                        entries: new_entries,
                        rect: new_rect,
                    })),
                )
            }
            Node::Branch { children, rect } => {
                if !rect.contains(&entry.pt) {
                    return RemoveResult::NotFound;
                }
                for (i, child) in children.iter().enumerate() {
                    match child.remove(entry) {
                        RemoveResult::NotFound => continue,
                        RemoveResult::Removed(orphans, None) => {
                            if children.len() == 1 {
                                return RemoveResult::Removed(orphans, None);
                            }
                            if children.len() == 2 {
                                trace!("collapsing two-child branch after child emptied");
                                let sibling = &children[1 - i];
                                let flattened = Joined::wrap(sibling.entries());
                                return RemoveResult::Removed(flattened.concat(orphans), None);
                            }
                            let mut new_children = children.clone();
                            new_children.remove(i);
                            let new_rect = self.contract(child.rect(), || {
                                new_children.iter().fold(Rect::EMPTY, |r, c| r.expand(c.rect()))
                            });
                            return RemoveResult::Removed(
                                orphans,
                                Some(Rc::new(Node::Branch {
                                    children: new_children,
                                    rect: new_rect,
                                })),
                            );
                        }
                        RemoveResult::Removed(orphans, Some(new_child)) => {
                            let mut new_children = children.clone();
                            new_children[i] = new_child;
                            let new_rect = self.contract(child.rect(), || {
                                new_children.iter().fold(Rect::EMPTY, |r, c| r.expand(c.rect()))
                            });
                            return RemoveResult::Removed(
                                orphans,
                                Some(Rc::new(Node::Branch {
                                    children: new_children,
                                    rect: new_rect,
                                })),
                            );
                        }
                    }
                }
                RemoveResult::NotFound
            }
        }
    }
}

type LeafIter<'a, T> = std::slice::Iter<'a, Entry<T>>;
type BranchIter<'a, T> = std::slice::Iter<'a, Rc<Node<T>>>;

enum NodeFrame<'a, T> {
    Leaf(LeafIter<'a, T>),
    Branch(BranchIter<'a, T>),
}

/// Lazy in-order traversal over every entry at or below a node.
pub struct NodeIter<'a, T> {
    stack: Vec<NodeFrame<'a, T>>,
}

impl<'a, T> NodeIter<'a, T> {
    fn new(node: &'a Node<T>) -> NodeIter<'a, T> {
        NodeIter {
            stack: vec![Self::frame(node)],
        }
    }

    fn frame(node: &'a Node<T>) -> NodeFrame<'a, T> {
        match node {
            Node::Leaf { entries, .. } => NodeFrame::Leaf(entries.iter()),
            Node::Branch { children, .. } => NodeFrame::Branch(children.iter()),
        }
    }
}

impl<'a, T> Iterator for NodeIter<'a, T> {
    type Item = &'a Entry<T>;

    fn next(&mut self) -> Option<&'a Entry<T>> {
        while let Some(frame) = self.stack.last_mut() {
            match frame {
                NodeFrame::Leaf(it) => match it.next() {
                    Some(entry) => return Some(entry),
                    None => {
                        self.stack.pop();
                    }
                },
                NodeFrame::Branch(it) => match it.next() {
                    Some(child) => self.stack.push(Self::frame(child)),
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn insert_into_empty_leaf_yields_degenerate_box() {
        let root = Node::<&'static str>::empty_leaf();
        let entry = Entry::new(Point::new(1.0, 2.0), "a");
        match root.insert(&entry, DEFAULT_MAX_ENTRIES, &mut rng()) {
            InsertResult::Replacement(node) => {
                assert_eq!(node.len(), 1);
                assert_eq!(*node.rect(), entry.pt.to_box());
            }
            InsertResult::Split(_) => panic!("a single insert should never split"),
        }
    }

    #[test]
    fn splitting_at_max_plus_one_yields_balanced_leaves() {
        let mut root = Rc::new(Node::<usize>::empty_leaf());
        let mut r = rng();
        for i in 0..5 {
            let entry = Entry::new(Point::new(i as f32, 0.0), i);
            root = match root.insert(&entry, 4, &mut r) {
                InsertResult::Replacement(node) => node,
                InsertResult::Split(parts) => {
                    let rect = parts.iter().fold(Rect::EMPTY, |acc, p| acc.expand(p.rect()));
                    Rc::new(Node::Branch { children: parts, rect })
                }
            };
        }
        assert_eq!(root.entries().len(), 5);
        if let Some(children) = root.branch_children() {
            for child in children {
                assert!(child.len() >= 2 && child.len() <= 4);
            }
        } else {
            panic!("expected a branch root after overflow");
        }
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let root = Node::<&'static str>::empty_leaf();
        let entry = Entry::new(Point::new(0.0, 0.0), "a");
        assert!(matches!(root.remove(&entry), RemoveResult::NotFound));
    }

    #[test]
    fn remove_second_to_last_leaf_entry_discards_leaf() {
        let mut r = rng();
        let e1 = Entry::new(Point::new(0.0, 0.0), "a");
        let e2 = Entry::new(Point::new(1.0, 1.0), "b");
        let leaf = match Node::empty_leaf().insert(&e1, DEFAULT_MAX_ENTRIES, &mut r) {
            InsertResult::Replacement(n) => n,
            _ => unreachable!(),
        };
        let leaf = match leaf.insert(&e2, DEFAULT_MAX_ENTRIES, &mut r) {
            InsertResult::Replacement(n) => n,
            _ => unreachable!(),
        };
        match leaf.remove(&e1) {
            RemoveResult::Removed(orphans, None) => {
                let remaining = orphans.into_vec();
                assert_eq!(remaining, vec![e2]);
            }
            _ => panic!("expected the two-entry leaf to dissolve"),
        }
    }
}
