// Copyright 2016 spatial-rs Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Tunables for a tree: fan-out and split tie-break determinism.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::node::DEFAULT_MAX_ENTRIES;

/// Construction parameters for an [`crate::RTree`].
///
/// `max_entries` bounds a leaf or branch's children before it splits. It's
/// a runtime value rather than a const generic so tests can exercise small
/// trees without every tree in the program sharing one fan-out.
#[derive(Debug, Clone)]
pub struct Config {
    max_entries: usize,
    rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_entries: DEFAULT_MAX_ENTRIES,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Panics if `max_entries < 2`: a node can't split into two groups
    /// that both meet the minimum fill otherwise.
    pub fn with_max_entries(mut self, max_entries: usize) -> Config {
        assert!(max_entries >= 2, "max_entries must allow a node to split in two");
        self.max_entries = max_entries;
        self
    }

    /// Fix the split tie-break RNG's seed, for reproducible tree shapes.
    pub fn with_seed(mut self, seed: u64) -> Config {
        self.rng_seed = Some(seed);
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub(crate) fn new_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_default_fan_out() {
        let cfg = Config::default();
        assert_eq!(cfg.max_entries(), DEFAULT_MAX_ENTRIES);
    }

    #[test]
    #[should_panic(expected = "max_entries must allow a node to split in two")]
    fn rejects_fan_out_below_two() {
        Config::new().with_max_entries(1);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        use rand::RngCore;
        let cfg = Config::new().with_seed(99);
        let a = cfg.new_rng().next_u64();
        let b = cfg.new_rng().next_u64();
        assert_eq!(a, b);
    }
}
