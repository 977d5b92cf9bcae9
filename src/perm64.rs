//! The 64-bit permutation family. Mirrors the 32-bit surface with wider
//! blocks, a 2^32 half-width split, and the 64-bit avalanche schedule.

use std::ops::RangeInclusive;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bits::block_for;
use crate::mix::{default_rounds_half, default_rounds_wide, CycleWalk, Mixer, RoundMix};
use crate::table::{TablePerm, MAX_TABLE};
use crate::word::{WordMix, DEFAULT_ROUNDS as WORD_ROUNDS};
use crate::{PermError, Variant};

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

const HALF_DOMAIN: u64 = 1 << 32;

/// Full-word schedule: the 30/27/31 xor-shift triple with its companion
/// multipliers.
const WORD_SHIFTS: [u32; 3] = [30, 27, 31];
const WORD_MULT1: u64 = 0xBF58_476D_1CE4_E5B9;
const WORD_MULT2: u64 = 0x94D0_49BB_1331_11EB;

/// A keyed permutation of a 64-bit integer domain.
///
/// Size encoding matches [`crate::Perm32`]: `size >= 0` is `[0, size)`,
/// `-1` the full 64-bit word domain, other negative sizes the unsigned
/// reinterpretation of their bit pattern.
#[derive(Clone, Debug)]
pub struct Perm64 {
    size: i64,
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

impl Perm64 {
    /// Builds a permutation of `size`, drawing round keys from `rng`.
    ///
    /// `rounds = 0` selects the default for the dispatched variant;
    /// negative round counts are rejected.
    pub fn new<R: Rng + ?Sized>(
        size: i64,
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
                let n = s as u64;
                let r = if requested == 0 {
                    default_rounds_wide(n)
                } else {
                    requested
                };
                (Inner::Wide(bounded(n, rng, r)), r)
            }
            s if (s as u64) <= MAX_TABLE => (Inner::Table(TablePerm::new(s as u64, rng)), 0),
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
    pub fn from_seed(size: i64, seed: u64, rounds: i32) -> Result<Self, PermError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(size, &mut rng, rounds)
    }

    /// The signed domain size, with `-1` denoting the full word domain.
    pub fn size(&self) -> i64 {
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

    /// The effective mixing round count; 0 for the table variant.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Whether `v` belongs to the domain.
    pub fn contains(&self, v: i64) -> bool {
        ((v as u64) as u128) < self.domain_len()
    }

    /// π(x). Fails when `x` is outside the domain.
    pub fn encode(&self, x: i64) -> Result<i64, PermError> {
        if !self.contains(x) {
            return Err(PermError::OutOfDomain(x));
        }
        Ok(self.encode_unchecked(x))
    }

    /// π⁻¹(y). Fails when `y` is outside the domain.
    pub fn decode(&self, y: i64) -> Result<i64, PermError> {
        if !self.contains(y) {
            return Err(PermError::OutOfDomain(y));
        }
        Ok(self.decode_unchecked(y))
    }

    /// π(x) without the domain check; the caller guarantees membership.
    pub fn encode_unchecked(&self, x: i64) -> i64 {
        self.encode_raw(x as u64) as i64
    }

    /// π⁻¹(y) without the domain check; the caller guarantees membership.
    pub fn decode_unchecked(&self, y: i64) -> i64 {
        self.decode_raw(y as u64) as i64
    }

    /// The lazy sequence `encode(0), encode(1), …` over the whole domain.
    pub fn iter(&self) -> Iter64<'_> {
        Iter64 {
            perm: self,
            cursor: 0,
            end: self.domain_len(),
        }
    }

    /// The lazy sequence `encode(offset), encode(offset + 1), …` to the end
    /// of the domain. `offset` may equal the domain size, yielding nothing.
    pub fn iter_from(&self, offset: i64) -> Result<Iter64<'_>, PermError> {
        let start = (offset as u64) as u128;
        let end = self.domain_len();
        if start > end {
            return Err(PermError::OutOfDomain(offset));
        }
        Ok(Iter64 {
            perm: self,
            cursor: start,
            end,
        })
    }

    /// Reorders `items` so that slot `i` receives `items[decode(i)]`.
    pub fn permuted<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, PermError> {
        self.check_len(items.len())?;
        Ok((0..items.len())
            .map(|i| items[self.decode_unchecked(i as i64) as usize].clone())
            .collect())
    }

    /// Inverse of [`Self::permuted`]: slot `i` receives `items[encode(i)]`.
    pub fn unpermuted<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, PermError> {
        self.check_len(items.len())?;
        Ok((0..items.len())
            .map(|i| items[self.encode_unchecked(i as i64) as usize].clone())
            .collect())
    }

    fn check_len(&self, len: usize) -> Result<(), PermError> {
        if self.size < 0 || self.size as u128 != len as u128 {
            return Err(PermError::SizeMismatch {
                size: self.size,
                len,
            });
        }
        Ok(())
    }

    fn domain_len(&self) -> u128 {
        match self.size {
            -1 => 1u128 << 64,
            s if s < 0 => (s as u64) as u128,
            s => s as u128,
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
    let mult = (GOLDEN >> (64 - k_bits)) | 1;
    let keys: Box<[u64]> = (0..rounds).map(|_| rng.next_u64()).collect();
    CycleWalk::new(n, RoundMix::new(n, mult, keys))
}

fn word_mix<R: Rng + ?Sized>(rng: &mut R, rounds: u32) -> WordMix {
    let keys1: Box<[u64]> = (0..rounds).map(|_| rng.next_u64()).collect();
    let keys2: Box<[u64]> = (0..rounds).map(|_| rng.next_u64()).collect();
    WordMix::new(64, WORD_SHIFTS, WORD_MULT1, WORD_MULT2, keys1, keys2)
}

/// Iterator over a [`Perm64`], yielding encoded values in index order.
///
/// The cursor is tracked in 128 bits so the full-word domain, one past the
/// largest `u64`, still has a representable end.
#[derive(Clone, Debug)]
pub struct Iter64<'a> {
    perm: &'a Perm64,
    cursor: u128,
    end: u128,
}

impl Iterator for Iter64<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.cursor >= self.end {
            return None;
        }
        let y = self.perm.encode_raw(self.cursor as u64);
        self.cursor += 1;
        Some(y as i64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.cursor).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// A [`Perm64`] shifted onto a contiguous window `[lo, hi]`.
#[derive(Clone, Debug)]
pub struct RangePerm64 {
    base: Perm64,
    lo: i64,
    hi: i64,
}

impl RangePerm64 {
    /// Builds a permutation of the inclusive window `range`.
    ///
    /// The window must be non-empty and its length must fit in `i64`.
    pub fn new<R: Rng + ?Sized>(
        range: RangeInclusive<i64>,
        rng: &mut R,
        rounds: i32,
    ) -> Result<Self, PermError> {
        let (lo, hi) = range.into_inner();
        if lo > hi {
            return Err(PermError::EmptyRange { lo, hi });
        }
        let len = hi as i128 - lo as i128 + 1;
        if len > i64::MAX as i128 {
            return Err(PermError::RangeTooLarge { lo, hi });
        }
        let base = Perm64::new(len as i64, rng, rounds)?;
        Ok(Self { base, lo, hi })
    }

    /// Seeded counterpart of [`RangePerm64::new`].
    pub fn from_seed(
        range: RangeInclusive<i64>,
        seed: u64,
        rounds: i32,
    ) -> Result<Self, PermError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(range, &mut rng, rounds)
    }

    /// The window this permutation covers.
    pub fn bounds(&self) -> RangeInclusive<i64> {
        self.lo..=self.hi
    }

    /// Number of values in the window.
    pub fn len(&self) -> i64 {
        self.base.size()
    }

    pub fn is_empty(&self) -> bool {
        // Always false; the constructor rejects empty windows.
        false
    }

    /// Whether `v` lies in the window.
    pub fn contains(&self, v: i64) -> bool {
        v >= self.lo && v <= self.hi
    }

    /// π over the window. Fails when `v` is outside `[lo, hi]`.
    pub fn encode(&self, v: i64) -> Result<i64, PermError> {
        if !self.contains(v) {
            return Err(PermError::OutOfDomain(v));
        }
        Ok(self.encode_unchecked(v))
    }

    /// π⁻¹ over the window. Fails when `v` is outside `[lo, hi]`.
    pub fn decode(&self, v: i64) -> Result<i64, PermError> {
        if !self.contains(v) {
            return Err(PermError::OutOfDomain(v));
        }
        Ok(self.decode_unchecked(v))
    }

    /// Unchecked translation; out-of-window values wrap silently.
    pub fn encode_unchecked(&self, v: i64) -> i64 {
        self.base
            .encode_unchecked(v.wrapping_sub(self.lo))
            .wrapping_add(self.lo)
    }

    /// Unchecked inverse translation; out-of-window values wrap silently.
    pub fn decode_unchecked(&self, v: i64) -> i64 {
        self.base
            .decode_unchecked(v.wrapping_sub(self.lo))
            .wrapping_add(self.lo)
    }

    /// Encoded window values, starting from the low end of the window.
    pub fn iter(&self) -> RangeIter64<'_> {
        RangeIter64 {
            inner: self.base.iter(),
            lo: self.lo,
        }
    }

    /// Encoded window values starting at window position `from`.
    pub fn iter_from(&self, from: i64) -> Result<RangeIter64<'_>, PermError> {
        if !self.contains(from) {
            return Err(PermError::OutOfDomain(from));
        }
        Ok(RangeIter64 {
            inner: self.base.iter_from(from.wrapping_sub(self.lo))?,
            lo: self.lo,
        })
    }
}

/// Iterator over a [`RangePerm64`].
#[derive(Clone, Debug)]
pub struct RangeIter64<'a> {
    inner: Iter64<'a>,
    lo: i64,
}

impl Iterator for RangeIter64<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.inner.next().map(|y| y.wrapping_add(self.lo))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
