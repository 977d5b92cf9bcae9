//! Bounded mixing engine: an invertible round mixer on a power-of-two
//! block, plus the cycle-walking wrapper restricting it to `[0, n)`.

use crate::bits::{block_for, inv_odd, inv_xor_shift, BitBlock};

/// An invertible bijection on a power-of-two block of words.
pub(crate) trait Mixer {
    fn apply(&self, x: u64) -> u64;
    fn unapply(&self, y: u64) -> u64;
}

/// One round multiplies by an odd constant, adds a round key and
/// xor-shifts, on a `k_bits`-wide block; the pass repeats once per round. Each step is invertible modulo `2^k_bits`, so the
/// whole pass is.
#[derive(Clone, Debug)]
pub(crate) struct RoundMix {
    mask: u64,
    k_bits: u32,
    rshift: u32,
    mult: u64,
    mult_inv: u64,
    keys: Box<[u64]>,
}

impl RoundMix {
    /// `mult` must be odd; one key per round, drawn by the caller.
    pub(crate) fn new(n: u64, mult: u64, keys: Box<[u64]>) -> Self {
        debug_assert!(mult & 1 == 1);
        debug_assert!(!keys.is_empty());
        let BitBlock {
            mask,
            k_bits,
            rshift,
        } = block_for(n);
        // Blocks narrower than 3 bits would degrade the xor-shift to a
        // no-op; such domains are served by the table variant instead.
        debug_assert!(rshift >= 1);
        let mult_inv = inv_odd(mult, mask);
        Self {
            mask,
            k_bits,
            rshift,
            mult,
            mult_inv,
            keys,
        }
    }
}

impl Mixer for RoundMix {
    fn apply(&self, mut x: u64) -> u64 {
        for &key in self.keys.iter() {
            x = x.wrapping_mul(self.mult).wrapping_add(key) & self.mask;
            x ^= x >> self.rshift;
        }
        x
    }

    fn unapply(&self, mut y: u64) -> u64 {
        for &key in self.keys.iter().rev() {
            y = inv_xor_shift(y, self.rshift, self.k_bits, self.mask);
            y = y.wrapping_sub(key).wrapping_mul(self.mult_inv) & self.mask;
        }
        y
    }
}

/// Cycle-walking restriction of a block mixer to `[0, n)`.
///
/// The mixer permutes the enclosing power-of-two block, so iterating it
/// from a value inside `[0, n)` must eventually re-enter `[0, n)`; the
/// expected number of passes is below two because the block is less than
/// twice the domain. Walking the inverse mixer the same way retraces the
/// chain exactly.
#[derive(Clone, Debug)]
pub(crate) struct CycleWalk<M> {
    n: u64,
    mixer: M,
}

impl<M: Mixer> CycleWalk<M> {
    pub(crate) fn new(n: u64, mixer: M) -> Self {
        debug_assert!(n >= 1);
        Self { n, mixer }
    }

    pub(crate) fn encode(&self, x: u64) -> u64 {
        let mut y = x;
        loop {
            y = self.mixer.apply(y);
            if y < self.n {
                return y;
            }
        }
    }

    pub(crate) fn decode(&self, y: u64) -> u64 {
        let mut x = y;
        loop {
            x = self.mixer.unapply(x);
            if x < self.n {
                return x;
            }
        }
    }
}

/// Default round count for half-width bounded domains.
pub(crate) fn default_rounds_half(n: u64) -> u32 {
    if n <= 1 << 10 {
        3
    } else if n <= 1 << 20 {
        4
    } else {
        6
    }
}

/// Default round count for bounded domains above half width, including
/// unsigned-reinterpreted sizes.
pub(crate) fn default_rounds_wide(n: u64) -> u32 {
    if n <= 1 << 16 {
        3
    } else if n <= 1 << 24 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn walk(n: u64, seed: u64, rounds: u32) -> CycleWalk<RoundMix> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let k_bits = crate::bits::block_for(n).k_bits;
        let mult = (0x9E37_79B9_7F4A_7C15u64 >> (64 - k_bits)) | 1;
        let keys = (0..rounds).map(|_| rng.next_u64()).collect();
        CycleWalk::new(n, RoundMix::new(n, mult, keys))
    }

    #[test]
    fn bijective_on_small_domains() {
        for &n in &[5u64, 17, 100, 257, 1000, 1 << 12] {
            for seed in 0..3u64 {
                let perm = walk(n, seed, 4);
                let mut seen = BTreeSet::new();
                for x in 0..n {
                    let y = perm.encode(x);
                    assert!(y < n, "output {y} out of range [0..{n})");
                    assert!(seen.insert(y), "duplicate output {y} for n={n}, seed={seed}");
                }
                assert_eq!(seen.len() as u64, n);
            }
        }
    }

    #[test]
    fn decode_inverts_encode() {
        for &n in &[17u64, 100, 1 << 16, (1 << 16) + 1, 1 << 33, u64::MAX] {
            let perm = walk(n, 99, 5);
            let mut x = 0u64;
            for _ in 0..500 {
                let y = perm.encode(x % n);
                assert_eq!(perm.decode(y), x % n);
                // Use the output stream itself as a spread-out input sample.
                x = x.wrapping_mul(6364136223846793005).wrapping_add(y);
            }
        }
    }

    #[test]
    fn power_of_two_domain_is_covered() {
        let n = 1u64 << 10;
        let perm = walk(n, 5, 3);
        let mut seen = BTreeSet::new();
        for x in 0..n {
            seen.insert(perm.encode(x));
        }
        assert_eq!(seen.len() as u64, n);
    }

    #[test]
    fn round_defaults_follow_bands() {
        assert_eq!(default_rounds_half(1 << 10), 3);
        assert_eq!(default_rounds_half((1 << 10) + 1), 4);
        assert_eq!(default_rounds_half(1 << 20), 4);
        assert_eq!(default_rounds_half((1 << 20) + 1), 6);
        assert_eq!(default_rounds_wide(1 << 16), 3);
        assert_eq!(default_rounds_wide((1 << 16) + 1), 4);
        assert_eq!(default_rounds_wide(1 << 24), 4);
        assert_eq!(default_rounds_wide((1 << 24) + 1), 5);
    }
}
