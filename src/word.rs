//! Full-word mixer: xor a round key, three xor-shift/multiply avalanche
//! stages, xor a second key. Operates on the whole word block, so no
//! cycle-walking is needed and every pass visits each value exactly once.

use crate::bits::{inv_odd, inv_xor_shift};
use crate::mix::Mixer;

/// Default round count for full-word permutations.
pub(crate) const DEFAULT_ROUNDS: u32 = 2;

#[derive(Clone, Debug)]
pub(crate) struct WordMix {
    mask: u64,
    width: u32,
    shifts: [u32; 3],
    mult1: u64,
    mult2: u64,
    inv1: u64,
    inv2: u64,
    keys1: Box<[u64]>,
    keys2: Box<[u64]>,
}

impl WordMix {
    /// Multipliers must be odd; the key slices carry one entry per round
    /// and their words fit the target width.
    pub(crate) fn new(
        width: u32,
        shifts: [u32; 3],
        mult1: u64,
        mult2: u64,
        keys1: Box<[u64]>,
        keys2: Box<[u64]>,
    ) -> Self {
        debug_assert!(width == 32 || width == 64);
        debug_assert_eq!(keys1.len(), keys2.len());
        debug_assert!(mult1 & 1 == 1 && mult2 & 1 == 1);
        debug_assert!(shifts.iter().all(|&s| s >= 1 && s < width));
        let mask = u64::MAX >> (64 - width);
        let inv1 = inv_odd(mult1, mask);
        let inv2 = inv_odd(mult2, mask);
        Self {
            mask,
            width,
            shifts,
            mult1,
            mult2,
            inv1,
            inv2,
            keys1,
            keys2,
        }
    }
}

impl Mixer for WordMix {
    fn apply(&self, mut x: u64) -> u64 {
        let [s0, s1, s2] = self.shifts;
        for r in 0..self.keys1.len() {
            x ^= self.keys1[r];
            x = (x ^ (x >> s0)).wrapping_mul(self.mult1) & self.mask;
            x = (x ^ (x >> s1)).wrapping_mul(self.mult2) & self.mask;
            x ^= x >> s2;
            x ^= self.keys2[r];
        }
        x
    }

    fn unapply(&self, mut y: u64) -> u64 {
        let [s0, s1, s2] = self.shifts;
        for r in (0..self.keys1.len()).rev() {
            y ^= self.keys2[r];
            y = inv_xor_shift(y, s2, self.width, self.mask).wrapping_mul(self.inv2) & self.mask;
            y = inv_xor_shift(y, s1, self.width, self.mask).wrapping_mul(self.inv1) & self.mask;
            y = inv_xor_shift(y, s0, self.width, self.mask);
            y ^= self.keys1[r];
        }
        y
    }
}
