//! The 32-bit permutation family: factory dispatch, checked and unchecked
//! encode/decode, iteration, and the contiguous-window adapter.

use std::ops::RangeInclusive;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bits::block_for;
use crate::mix::{default_rounds_half, default_rounds_wide, CycleWalk, Mixer, RoundMix};
use crate::table::{TablePerm, MAX_TABLE};
use crate::word::{WordMix, DEFAULT_ROUNDS as WORD_ROUNDS};
use crate::{PermError, Variant};

/// Golden-ratio constant whose high bits supply the bounded multiplier.
const GOLDEN: u32 = 0x9E37_79B9;

/// Largest domain the half-width arm covers.
const HALF_DOMAIN: u64 = 1 << 16;

/// Full-word xor-shift schedule and multipliers (the xxHash32 avalanche
/// primes).
const WORD_SHIFTS: [u32; 3] = [15, 13, 16];
const WORD_MULT1: u64 = 0x85EB_CA77;
const WORD_MULT2: u64 = 0xC2B2_AE3D;

/// A keyed permutation of a 32-bit integer domain.
///
/// The signed `size` selects the domain: `size >= 0` is `[0, size)`, `-1`
/// is the full 32-bit word domain, and any other negative size denotes the
/// domain whose cardinality is the unsigned reinterpretation of its bit
/// pattern. In the latter two cases the API still speaks `i32`, with bit
/// patterns compared as unsigned.
///
/// Identical `(size, seed, rounds)` always rebuild the identical mapping.
///
/// ```
/// use mixperm::Perm32;
///
/// let perm = Perm32::from_seed(100, 1, 0)?;
/// assert_eq!(perm.decode(perm.encode(42)?)?, 42);
/// # Ok::<(), mixperm::PermError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Perm32 {
    size: i32,
    rounds: u32,
    inner: Inner,
}

#[derive(Clone, Debug)]
enum Inner {
    Table(TablePerm),
    Half(CycleWalk<RoundMix>),
    Wide(CycleWalk<RoundMix>),
    Word(WordMix),
}

impl Perm32 {
    /// Builds a permutation of `size`, drawing round keys from `rng`.
    ///
    /// `rounds = 0` selects the default for the dispatched variant;
    /// negative round counts are rejected. The RNG is consumed during
    /// construction only and is not retained.
    pub fn new<R: Rng + ?Sized>(
        size: i32,
        rng: &mut R,
        rounds: i32,
    ) -> Result<Self, PermError> {
        if rounds < 0 {
            return Err(PermError::InvalidRounds(rounds as i64));
        }
        let requested = rounds as u32;
        let (inner, rounds) = match size {
            -1 => {
                let r = if requested == 0 { WORD_ROUNDS } else { requested };
                (Inner::Word(word_mix(rng, r)), r)
            }
            s if s < -1 => {
                let n = s as u32 as u64;
                let r = if requested == 0 {
                    default_rounds_wide(n)
                } else {
                    requested
                };
                (Inner::Wide(bounded(n, rng, r)), r)
            }
            s if s as u64 <= MAX_TABLE => (Inner::Table(TablePerm::new(s as u64, rng)), 0),
            s if (s as u64) <= HALF_DOMAIN => {
                let n = s as u64;
                let r = if requested == 0 {
                    default_rounds_half(n)
                } else {
                    requested
                };
                (Inner::Half(bounded(n, rng, r)), r)
            }
            s => {
                let n = s as u64;
                let r = if requested == 0 {
                    default_rounds_wide(n)
                } else {
                    requested
                };
                (Inner::Wide(bounded(n, rng, r)), r)
            }
        };
        Ok(Self {
            size,
            rounds,
            inner,
        })
    }

    /// Builds a permutation from a 64-bit seed.
    pub fn from_seed(size: i32, seed: u64, rounds: i32) -> Result<Self, PermError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(size, &mut rng, rounds)
    }

    /// The signed domain size, with `-1` denoting the full word domain.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// The engine the factory dispatched to.
    pub fn variant(&self) -> Variant {
        match self.inner {
            Inner::Table(_) => Variant::Table,
            Inner::Half(_) => Variant::BoundedHalf,
            Inner::Wide(_) => Variant::BoundedFull,
            Inner::Word(_) => Variant::FullWord,
        }
    }

    /// The effective mixing round count; 0 for the table variant, which
    /// has no rounds.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Whether `v` belongs to the domain.
    pub fn contains(&self, v: i32) -> bool {
        (v as u32 as u64) < self.domain_len()
    }

    /// π(x). Fails when `x` is outside the domain.
    pub fn encode(&self, x: i32) -> Result<i32, PermError> {
        if !self.contains(x) {
            return Err(PermError::OutOfDomain(x as i64));
        }
        Ok(self.encode_unchecked(x))
    }

    /// π⁻¹(y). Fails when `y` is outside the domain.
    pub fn decode(&self, y: i32) -> Result<i32, PermError> {
        if !self.contains(y) {
            return Err(PermError::OutOfDomain(y as i64));
        }
        Ok(self.decode_unchecked(y))
    }

    /// π(x) without the domain check; the caller guarantees membership.
    pub fn encode_unchecked(&self, x: i32) -> i32 {
        self.encode_raw(x as u32 as u64) as u32 as i32
    }

    /// π⁻¹(y) without the domain check; the caller guarantees membership.
    pub fn decode_unchecked(&self, y: i32) -> i32 {
        self.decode_raw(y as u32 as u64) as u32 as i32
    }

    /// The lazy sequence `encode(0), encode(1), …` over the whole domain.
    pub fn iter(&self) -> Iter32<'_> {
        Iter32 {
            perm: self,
            cursor: 0,
            end: self.domain_len(),
        }
    }

    /// The lazy sequence `encode(offset), encode(offset + 1), …` to the end
    /// of the domain. `offset` may equal the domain size, yielding nothing.
    pub fn iter_from(&self, offset: i32) -> Result<Iter32<'_>, PermError> {
        let start = offset as u32 as u64;
        let end = self.domain_len();
        if start > end {
            return Err(PermError::OutOfDomain(offset as i64));
        }
        Ok(Iter32 {
            perm: self,
            cursor: start,
            end,
        })
    }

    /// Reorders `items` so that slot `i` receives `items[decode(i)]`.
    ///
    /// The permutation size must be non-negative and equal the list length.
    pub fn permuted<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, PermError> {
        self.check_len(items.len())?;
        Ok((0..items.len())
            .map(|i| items[self.decode_unchecked(i as i32) as usize].clone())
            .collect())
    }

    /// Inverse of [`Self::permuted`]: slot `i` receives `items[encode(i)]`.
    pub fn unpermuted<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, PermError> {
        self.check_len(items.len())?;
        Ok((0..items.len())
            .map(|i| items[self.encode_unchecked(i as i32) as usize].clone())
            .collect())
    }

    fn check_len(&self, len: usize) -> Result<(), PermError> {
        if self.size < 0 || self.size as u64 != len as u64 {
            return Err(PermError::SizeMismatch {
                size: self.size as i64,
                len,
            });
        }
        Ok(())
    }

    fn domain_len(&self) -> u64 {
        match self.size {
            -1 => 1 << 32,
            s if s < 0 => s as u32 as u64,
            s => s as u64,
        }
    }

    fn encode_raw(&self, x: u64) -> u64 {
        match &self.inner {
            Inner::Table(t) => t.encode(x),
            Inner::Half(m) | Inner::Wide(m) => m.encode(x),
            Inner::Word(w) => w.apply(x),
        }
    }

    fn decode_raw(&self, y: u64) -> u64 {
        match &self.inner {
            Inner::Table(t) => t.decode(y),
            Inner::Half(m) | Inner::Wide(m) => m.decode(y),
            Inner::Word(w) => w.unapply(y),
        }
    }
}

fn bounded<R: Rng + ?Sized>(n: u64, rng: &mut R, rounds: u32) -> CycleWalk<RoundMix> {
    let k_bits = block_for(n).k_bits;
    let mult = ((GOLDEN >> (32 - k_bits)) | 1) as u64;
    let keys: Box<[u64]> = (0..rounds).map(|_| rng.next_u32() as u64).collect();
    CycleWalk::new(n, RoundMix::new(n, mult, keys))
}

fn word_mix<R: Rng + ?Sized>(rng: &mut R, rounds: u32) -> WordMix {
    let keys1: Box<[u64]> = (0..rounds).map(|_| rng.next_u32() as u64).collect();
    let keys2: Box<[u64]> = (0..rounds).map(|_| rng.next_u32() as u64).collect();
    WordMix::new(32, WORD_SHIFTS, WORD_MULT1, WORD_MULT2, keys1, keys2)
}

/// Iterator over a [`Perm32`], yielding encoded values in index order.
#[derive(Clone, Debug)]
pub struct Iter32<'a> {
    perm: &'a Perm32,
    cursor: u64,
    end: u64,
}

impl Iterator for Iter32<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.cursor >= self.end {
            return None;
        }
        let y = self.perm.encode_raw(self.cursor);
        self.cursor += 1;
        Some(y as u32 as i32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.cursor).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// A [`Perm32`] shifted onto a contiguous window `[lo, hi]`.
///
/// `encode(v)` is `lo + base.encode(v - lo)`; the underlying permutation
/// covers `[0, hi - lo + 1)`.
#[derive(Clone, Debug)]
pub struct RangePerm32 {
    base: Perm32,
    lo: i32,
    hi: i32,
}

impl RangePerm32 {
    /// Builds a permutation of the inclusive window `range`.
    ///
    /// The window must be non-empty and its length must fit in `i32`.
    pub fn new<R: Rng + ?Sized>(
        range: RangeInclusive<i32>,
        rng: &mut R,
        rounds: i32,
    ) -> Result<Self, PermError> {
        let (lo, hi) = range.into_inner();
        if lo > hi {
            return Err(PermError::EmptyRange {
                lo: lo as i64,
                hi: hi as i64,
            });
        }
        let len = hi as i64 - lo as i64 + 1;
        if len > i32::MAX as i64 {
            return Err(PermError::RangeTooLarge {
                lo: lo as i64,
                hi: hi as i64,
            });
        }
        let base = Perm32::new(len as i32, rng, rounds)?;
        Ok(Self { base, lo, hi })
    }

    /// Seeded counterpart of [`RangePerm32::new`].
    pub fn from_seed(
        range: RangeInclusive<i32>,
        seed: u64,
        rounds: i32,
    ) -> Result<Self, PermError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(range, &mut rng, rounds)
    }

    /// The window this permutation covers.
    pub fn bounds(&self) -> RangeInclusive<i32> {
        self.lo..=self.hi
    }

    /// Number of values in the window.
    pub fn len(&self) -> i32 {
        self.base.size()
    }

    pub fn is_empty(&self) -> bool {
        // Always false; the constructor rejects empty windows.
        false
    }

    /// Whether `v` lies in the window.
    pub fn contains(&self, v: i32) -> bool {
        v >= self.lo && v <= self.hi
    }

    /// π over the window. Fails when `v` is outside `[lo, hi]`.
    pub fn encode(&self, v: i32) -> Result<i32, PermError> {
        if !self.contains(v) {
            return Err(PermError::OutOfDomain(v as i64));
        }
        Ok(self.encode_unchecked(v))
    }

    /// π⁻¹ over the window. Fails when `v` is outside `[lo, hi]`.
    pub fn decode(&self, v: i32) -> Result<i32, PermError> {
        if !self.contains(v) {
            return Err(PermError::OutOfDomain(v as i64));
        }
        Ok(self.decode_unchecked(v))
    }

    /// Unchecked translation; out-of-window values wrap silently.
    pub fn encode_unchecked(&self, v: i32) -> i32 {
        self.base
            .encode_unchecked(v.wrapping_sub(self.lo))
            .wrapping_add(self.lo)
    }

    /// Unchecked inverse translation; out-of-window values wrap silently.
    pub fn decode_unchecked(&self, v: i32) -> i32 {
        self.base
            .decode_unchecked(v.wrapping_sub(self.lo))
            .wrapping_add(self.lo)
    }

    /// Encoded window values, starting from the low end of the window.
    pub fn iter(&self) -> RangeIter32<'_> {
        RangeIter32 {
            inner: self.base.iter(),
            lo: self.lo,
        }
    }

    /// Encoded window values starting at window position `from`.
    pub fn iter_from(&self, from: i32) -> Result<RangeIter32<'_>, PermError> {
        if !self.contains(from) {
            return Err(PermError::OutOfDomain(from as i64));
        }
        Ok(RangeIter32 {
            inner: self.base.iter_from(from.wrapping_sub(self.lo))?,
            lo: self.lo,
        })
    }
}

/// Iterator over a [`RangePerm32`].
#[derive(Clone, Debug)]
pub struct RangeIter32<'a> {
    inner: Iter32<'a>,
    lo: i32,
}

impl Iterator for RangeIter32<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        self.inner.next().map(|y| y.wrapping_add(self.lo))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
