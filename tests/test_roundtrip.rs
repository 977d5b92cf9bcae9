//! Universal invariants: round-trip, bijectivity, determinism, support
//! containment, iterator consistency, and the window adapter.

use std::collections::BTreeSet;

use anyhow::Result;
use mixperm::{Perm32, Perm64, RangePerm32, RangePerm64};

#[test]
fn round_trip_32() -> Result<()> {
    for &size in &[1i32, 2, 5, 16, 17, 100, 511, 512, 65_536, 1_000_000] {
        for seed in 0..5u64 {
            let perm = Perm32::from_seed(size, seed, 0)?;
            let step = (size / 257).max(1);
            let mut x = 0;
            while x < size {
                let y = perm.encode(x)?;
                assert!(y >= 0 && y < size, "size={size} seed={seed}");
                assert_eq!(perm.decode(y)?, x);
                assert_eq!(perm.encode(perm.decode(x)?)?, x);
                x += step;
            }
        }
    }
    Ok(())
}

#[test]
fn round_trip_64() -> Result<()> {
    for &size in &[17i64, 100, 1 << 20, (1 << 32) + 5, 1 << 40] {
        for seed in 0..3u64 {
            let perm = Perm64::from_seed(size, seed, 0)?;
            let step = (size / 101).max(1);
            let mut x = 0;
            while x < size {
                let y = perm.encode(x)?;
                assert!(y >= 0 && y < size, "size={size} seed={seed}");
                assert_eq!(perm.decode(y)?, x);
                x += step;
            }
        }
    }
    Ok(())
}

#[test]
fn bijective_up_to_2_16() -> Result<()> {
    for &size in &[1i32, 2, 16, 17, 100, 1000, 1 << 16] {
        let perm = Perm32::from_seed(size, 7, 0)?;
        let mut seen = BTreeSet::new();
        for x in 0..size {
            let y = perm.encode(x)?;
            assert!(y >= 0 && y < size);
            assert!(seen.insert(y), "duplicate output {y} for size={size}");
        }
        assert_eq!(seen.len(), size as usize);
    }
    Ok(())
}

#[test]
fn unsigned_reinterpreted_sizes_round_trip() -> Result<()> {
    // size -2 denotes 2^32 - 2 values; i32::MIN denotes exactly 2^31.
    for &size in &[-2i32, -100, i32::MIN] {
        let perm = Perm32::from_seed(size, 11, 0)?;
        for &x in &[0i32, 1, 1 << 20, i32::MAX, i32::MIN, -101] {
            if !perm.contains(x) {
                continue;
            }
            let y = perm.encode(x)?;
            assert!(perm.contains(y));
            assert_eq!(perm.decode(y)?, x);
        }
    }
    Ok(())
}

#[test]
fn full_word_round_trip_32() -> Result<()> {
    let perm = Perm32::from_seed(-1, 1, 0)?;
    let mut x = 0x1234_5678u32 as i32;
    for _ in 0..10_000 {
        let y = perm.encode(x)?;
        assert_eq!(perm.decode(y)?, x);
        x = y;
    }
    Ok(())
}

#[test]
fn full_word_round_trip_64() -> Result<()> {
    let perm = Perm64::from_seed(-1, 1, 0)?;
    let mut x = 0x0123_4567_89AB_CDEFu64 as i64;
    for _ in 0..10_000 {
        let y = perm.encode(x)?;
        assert_eq!(perm.decode(y)?, x);
        x = y;
    }
    Ok(())
}

#[test]
fn determinism() -> Result<()> {
    for &size in &[100i32, 65_537, -1] {
        let a = Perm32::from_seed(size, 42, 0)?;
        let b = Perm32::from_seed(size, 42, 0)?;
        for x in 0..100 {
            assert_eq!(a.encode(x)?, b.encode(x)?);
        }
        let xs: Vec<i32> = a.iter().take(50).collect();
        let ys: Vec<i32> = b.iter().take(50).collect();
        assert_eq!(xs, ys);
    }
    Ok(())
}

#[test]
fn different_seeds_differ() -> Result<()> {
    let a = Perm32::from_seed(1000, 0, 0)?;
    let b = Perm32::from_seed(1000, 1, 0)?;
    assert!(
        (0..1000).any(|x| a.encode_unchecked(x) != b.encode_unchecked(x)),
        "different seeds should produce different permutations"
    );
    Ok(())
}

#[test]
fn iterator_matches_encode() -> Result<()> {
    let perm = Perm32::from_seed(1000, 3, 0)?;
    for offset in [0, 1, 500, 999, 1000] {
        let got: Vec<i32> = perm.iter_from(offset)?.collect();
        assert_eq!(got.len(), (1000 - offset) as usize);
        for (i, y) in got.iter().enumerate() {
            assert_eq!(*y, perm.encode(offset + i as i32)?);
        }
    }
    assert!(perm.iter_from(1001).is_err());
    Ok(())
}

#[test]
fn iterator_size_hint_is_exact() -> Result<()> {
    let perm = Perm64::from_seed(5000, 8, 0)?;
    let mut iter = perm.iter_from(4000)?;
    assert_eq!(iter.size_hint(), (1000, Some(1000)));
    iter.next();
    assert_eq!(iter.size_hint(), (999, Some(999)));
    Ok(())
}

#[test]
fn range_window_round_trip() -> Result<()> {
    let perm = RangePerm32::from_seed(-100..=199, 5, 0)?;
    assert_eq!(perm.len(), 300);
    let mut seen = BTreeSet::new();
    for v in -100..=199 {
        let y = perm.encode(v)?;
        assert!((-100..=199).contains(&y));
        assert_eq!(perm.decode(y)?, v);
        seen.insert(y);
    }
    assert_eq!(seen.len(), 300);

    let vals: Vec<i32> = perm.iter().collect();
    assert_eq!(vals.len(), 300);
    for (i, y) in vals.iter().enumerate() {
        assert_eq!(*y, perm.encode(-100 + i as i32)?);
    }

    let tail: Vec<i32> = perm.iter_from(150)?.collect();
    assert_eq!(tail.len(), 50);
    assert_eq!(tail[0], perm.encode(150)?);
    Ok(())
}

#[test]
fn range_window_round_trip_64() -> Result<()> {
    let lo = -5_000_000_000i64;
    let perm = RangePerm64::from_seed(lo..=lo + 999, 21, 0)?;
    for v in [lo, lo + 1, lo + 500, lo + 999] {
        let y = perm.encode(v)?;
        assert!(perm.contains(y));
        assert_eq!(perm.decode(y)?, v);
    }
    Ok(())
}

#[test]
fn tiny_windows_use_the_table() -> Result<()> {
    let perm = RangePerm32::from_seed(7..=13, 2, 0)?;
    let mut seen = BTreeSet::new();
    for v in 7..=13 {
        let y = perm.encode(v)?;
        assert!((7..=13).contains(&y));
        seen.insert(y);
    }
    assert_eq!(seen.len(), 7);
    Ok(())
}

#[test]
fn permutations_are_shareable_across_threads() -> Result<()> {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    let perm = Perm64::from_seed(1000, 1, 0)?;
    assert_send_sync(&perm);
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for x in 0..1000 {
                    let y = perm.encode_unchecked(x);
                    assert_eq!(perm.decode_unchecked(y), x);
                }
            });
        }
    });
    Ok(())
}
