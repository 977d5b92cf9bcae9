//! Shuffled-table permutation for tiny domains, where materializing the
//! mapping is cheaper than mixing.

use rand::{Rng, RngExt};

/// Largest domain served by the table variant.
pub(crate) const MAX_TABLE: u64 = 16;

/// Forward and inverse arrays, filled once at construction by a uniform
/// Fisher-Yates shuffle of the identity permutation.
#[derive(Clone, Debug)]
pub(crate) struct TablePerm {
    fwd: Box<[u64]>,
    inv: Box<[u64]>,
}

impl TablePerm {
    pub(crate) fn new<R: Rng + ?Sized>(n: u64, rng: &mut R) -> Self {
        debug_assert!(n <= MAX_TABLE);
        let mut fwd: Vec<u64> = (0..n).collect();
        for i in (1..fwd.len()).rev() {
            let j = rng.random_range(0..=i);
            fwd.swap(i, j);
        }
        let mut inv = vec![0u64; fwd.len()];
        for (i, &v) in fwd.iter().enumerate() {
            inv[v as usize] = i as u64;
        }
        Self {
            fwd: fwd.into_boxed_slice(),
            inv: inv.into_boxed_slice(),
        }
    }

    pub(crate) fn encode(&self, x: u64) -> u64 {
        self.fwd[x as usize]
    }

    pub(crate) fn decode(&self, y: u64) -> u64 {
        self.inv[y as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn tables_are_permutations() {
        for n in 0..=MAX_TABLE {
            for seed in 0..8u64 {
                let mut rng = SmallRng::seed_from_u64(seed);
                let table = TablePerm::new(n, &mut rng);
                let seen: BTreeSet<u64> = (0..n).map(|x| table.encode(x)).collect();
                assert_eq!(seen.len() as u64, n);
                assert!(seen.iter().all(|&y| y < n));
            }
        }
    }

    #[test]
    fn inverse_matches_forward() {
        let mut rng = SmallRng::seed_from_u64(3);
        let table = TablePerm::new(16, &mut rng);
        for x in 0..16 {
            assert_eq!(table.decode(table.encode(x)), x);
            assert_eq!(table.encode(table.decode(x)), x);
        }
    }

    #[test]
    fn same_seed_same_table() {
        let mut a = SmallRng::seed_from_u64(5);
        let mut b = SmallRng::seed_from_u64(5);
        let ta = TablePerm::new(10, &mut a);
        let tb = TablePerm::new(10, &mut b);
        for x in 0..10 {
            assert_eq!(ta.encode(x), tb.encode(x));
        }
    }
}
