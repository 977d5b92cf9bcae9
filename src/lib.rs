//! # mixperm
//!
//! Deterministic, keyed, reversible permutations over bounded integer
//! domains.
//!
//! Given a domain size `n` and a seed, the crate builds a bijection
//! π: [0, n) → [0, n) whose forward and inverse directions, `encode` and
//! `decode`, both run in O(1) expected time with no materialized table
//! (except for domains of at most 16 values, which use a shuffled table).
//! The same construction covers the full 32- or 64-bit word domain through
//! a sentinel size of `-1`.
//!
//! Bounded domains are handled by cycle-walking: an invertible mixer
//! (multiply, add a round key, xor-shift) permutes the smallest enclosing
//! power-of-two block, and is iterated until the output lands back inside
//! `[0, n)`. Because the mixer is a bijection on the block and the block is
//! less than twice the domain, the expected number of passes is below two.
//!
//! ## Example
//!
//! ```
//! use mixperm::Perm32;
//!
//! let perm = Perm32::from_seed(1000, 42, 0)?;
//! let y = perm.encode(123)?;
//! assert_eq!(perm.decode(y)?, 123);
//!
//! // Every domain value appears exactly once.
//! let mut seen: Vec<i32> = perm.iter().collect();
//! seen.sort_unstable();
//! assert!(seen.iter().copied().eq(0..1000));
//! # Ok::<(), mixperm::PermError>(())
//! ```
//!
//! Permutations are immutable after construction and freely shared across
//! threads; the supplied RNG is consumed during construction only. The
//! permutation is **not** a cryptographic PRP: the keys are recoverable
//! from a handful of input/output pairs. Callers wanting more dispersion
//! raise the round count.

#![forbid(unsafe_code)]

mod bits;
mod mix;
mod perm32;
mod perm64;
mod table;
mod word;

pub use perm32::{Iter32, Perm32, RangeIter32, RangePerm32};
pub use perm64::{Iter64, Perm64, RangeIter64, RangePerm64};

use thiserror::Error;

/// The concrete engine a permutation was dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Materialized shuffle table; domains of at most 16 values.
    Table,
    /// Bounded mixer whose block fits in half the word width.
    BoundedHalf,
    /// Bounded mixer above half the word width, including sizes given as
    /// unsigned reinterpretations of negative values.
    BoundedFull,
    /// Mixer over every word value; no cycle-walking involved.
    FullWord,
}

/// Errors surfaced by factories, checked entry points and list helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermError {
    /// The factory was asked for a negative number of rounds.
    #[error("rounds must be non-negative, got {0}")]
    InvalidRounds(i64),
    /// A checked `encode`/`decode` argument lies outside the domain.
    #[error("value {0} is outside the permutation domain")]
    OutOfDomain(i64),
    /// A range factory received a reversed window.
    #[error("range {lo}..={hi} is empty")]
    EmptyRange { lo: i64, hi: i64 },
    /// The window length does not fit in the signed domain.
    #[error("range {lo}..={hi} is longer than the signed domain")]
    RangeTooLarge { lo: i64, hi: i64 },
    /// A list helper received a list whose length differs from the domain.
    #[error("permutation size {size} does not match list length {len}")]
    SizeMismatch { size: i64, len: usize },
}
