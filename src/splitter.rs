// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The linear-cost seed-picking split heuristic, shared by leaf and branch
//! overflow handling.

use std::rc::Rc;

use rand::Rng;

use crate::entry::Entry;
use crate::geometry::{Geometry, Rect};
use crate::node::Node;

/// Pick the pair of members that would waste the most area if forced into
/// the same group, normalized per axis so neither axis dominates on scale.
/// Falls back to `(0, 1)` when every member shares the same extent on an
/// axis (would otherwise divide by zero).
fn pick_seeds<M: Geometry>(members: &[M]) -> (usize, usize) {
    let mut best_axis_separation = f32::NEG_INFINITY;
    let mut seeds = (0, 1);

    for axis in 0..2 {
        let (low, high): (Vec<f32>, Vec<f32>) = members
            .iter()
            .map(|m| {
                let r = m.bounding_rect();
                if axis == 0 { (r.x, r.x2) } else { (r.y, r.y2) }
            })
            .unzip();

        let mut highest_low = f32::NEG_INFINITY;
        let mut highest_low_idx = 0;
        let mut lowest_high = f32::INFINITY;
        let mut lowest_high_idx = 0;
        let mut overall_low = f32::INFINITY;
        let mut overall_high = f32::NEG_INFINITY;

        for i in 0..members.len() {
            if low[i] > highest_low {
                highest_low = low[i];
                highest_low_idx = i;
            }
            if high[i] < lowest_high {
                lowest_high = high[i];
                lowest_high_idx = i;
            }
            overall_low = overall_low.min(low[i]);
            overall_high = overall_high.max(high[i]);
        }

        let width = overall_high - overall_low;
        let separation = if width > 0.0 {
            (highest_low - lowest_high) / width
        } else {
            0.0
        };

        if separation > best_axis_separation && highest_low_idx != lowest_high_idx {
            best_axis_separation = separation;
            seeds = (lowest_high_idx, highest_low_idx);
        }
    }

    if seeds.0 == seeds.1 {
        seeds = (0, 1);
    }
    seeds
}

/// Distribute `members` across two groups, seeded at the most-separated
/// pair, greedily assigning the rest to whichever group needs the least
/// extra area. Guarantees both groups end with at least 2 members so a
/// split never immediately underflows.
fn split_members<M: Geometry, R: Rng>(mut members: Vec<M>, rng: &mut R) -> (Vec<M>, Rect, Vec<M>, Rect) {
    let (i, j) = pick_seeds(&members);
    let (seed_a, seed_b) = if i < j {
        let b = members.remove(j);
        let a = members.remove(i);
        (a, b)
    } else {
        let a = members.remove(i);
        let b = members.remove(j);
        (a, b)
    };

    let mut rect_a = seed_a.bounding_rect();
    let mut rect_b = seed_b.bounding_rect();
    let mut group_a = vec![seed_a];
    let mut group_b = vec![seed_b];

    let remaining = members.len();
    for (idx, member) in members.into_iter().enumerate() {
        let left_in_pool = remaining - idx - 1;
        // Force the rest into whichever group still needs to reach the
        // minimum of 2 before falling back to the area heuristic.
        if group_a.len() < 2 && group_a.len() + left_in_pool == 1 {
            rect_a = rect_a.expand(&member.bounding_rect());
            group_a.push(member);
            continue;
        }
        if group_b.len() < 2 && group_b.len() + left_in_pool == 1 {
            rect_b = rect_b.expand(&member.bounding_rect());
            group_b.push(member);
            continue;
        }

        let cost_a = rect_a.expand_area(&member.bounding_rect());
        let cost_b = rect_b.expand_area(&member.bounding_rect());

        let goes_to_a = if cost_a != cost_b {
            cost_a < cost_b
        } else {
            let area_a = rect_a.expand(&member.bounding_rect()).area();
            let area_b = rect_b.expand(&member.bounding_rect()).area();
            if area_a != area_b {
                area_a < area_b
            } else {
                rng.gen_bool(0.5)
            }
        };

        if goes_to_a {
            rect_a = rect_a.expand(&member.bounding_rect());
            group_a.push(member);
        } else {
            rect_b = rect_b.expand(&member.bounding_rect());
            group_b.push(member);
        }
    }

    (group_a, rect_a, group_b, rect_b)
}

pub fn split_leaf<T: Clone, R: Rng>(entries: Vec<Entry<T>>, rng: &mut R) -> (Node<T>, Node<T>) {
    let (a, rect_a, b, rect_b) = split_members(entries, rng);
    (
        Node::Leaf { entries: a, rect: rect_a },
        Node::Leaf { entries: b, rect: rect_b },
    )
}

pub fn split_branch<T: Clone, R: Rng>(children: Vec<Rc<Node<T>>>, rng: &mut R) -> (Node<T>, Node<T>) {
    let (a, rect_a, b, rect_b) = split_members(children, rng);
    (
        Node::Branch { children: a, rect: rect_a },
        Node::Branch { children: b, rect: rect_b },
    )
}
