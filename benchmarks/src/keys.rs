//! Random key source
//!
//! Keys are drawn as machine-width integers, folded to non-negative and then
//! reduced into a range scaled from the caller's bound:
//!
//! | bound                     | range           |
//! |---------------------------|-----------------|
//! | `<= 0`                    | `[0, 100)`      |
//! | `< i32::MAX / 4`          | `[0, bound * 4)`|
//! | otherwise                 | `[0, bound)`    |

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Modulus used when the bound is not positive.
pub const DEFAULT_KEY_SPAN: i32 = 100;

/// Scale factor applied to small bounds.
pub const KEY_SPAN_FACTOR: i32 = 4;

/// Draw a key in the range scaled from `bound` using the thread RNG.
pub fn next_key(bound: i32) -> i32 {
    fold_key(rand::thread_rng().gen::<i32>(), bound)
}

/// Exclusive upper limit of the keys produced for `bound`.
pub fn key_span(bound: i32) -> i32 {
    if bound <= 0 {
        DEFAULT_KEY_SPAN
    } else if bound < i32::MAX / KEY_SPAN_FACTOR {
        bound * KEY_SPAN_FACTOR
    } else {
        bound
    }
}

/// Fold a raw draw into `[0, key_span(bound))`.
///
/// Negative draws map through `v -> -(1 + v)`, so `-1` becomes `0` and
/// `i32::MIN` becomes `i32::MAX` without overflow.
pub fn fold_key(raw: i32, bound: i32) -> i32 {
    let non_negative = if raw < 0 { -(1 + raw) } else { raw };
    non_negative % key_span(bound)
}

/// Anything that can fabricate insertion keys for a backend.
pub trait KeySource {
    /// Draw a key in `[0, key_span(bound))`.
    fn next_key(&mut self, bound: i32) -> i32;
}

/// Pseudo-random keys backed by a [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomKeys {
    rng: StdRng,
}

impl RandomKeys {
    /// Keys seeded from OS entropy; not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible keys for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl Default for RandomKeys {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl KeySource for RandomKeys {
    fn next_key(&mut self, bound: i32) -> i32 {
        fold_key(self.rng.gen::<i32>(), bound)
    }
}

/// Replays a fixed list of keys verbatim, then falls back to random draws.
///
/// Useful for reproducing a specific collision pattern in a run.
#[derive(Debug, Clone)]
pub struct ScriptedKeys {
    script: VecDeque<i32>,
    fallback: RandomKeys,
    drawn: usize,
}

impl ScriptedKeys {
    pub fn new(script: impl IntoIterator<Item = i32>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: RandomKeys::from_entropy(),
            drawn: 0,
        }
    }

    pub fn with_fallback(mut self, fallback: RandomKeys) -> Self {
        self.fallback = fallback;
        self
    }

    /// Keys still queued in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Total number of keys handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self, bound: i32) -> i32 {
        self.drawn += 1;
        match self.script.pop_front() {
            Some(key) => key,
            None => self.fallback.next_key(bound),
        }
    }
}
