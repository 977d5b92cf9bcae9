//! Dispersion probe for the shipped permutation variants.
//!
//! Two measurements, each across many independently seeded permutations:
//! - sample-mean z-scores of encoded outputs over sequential input
//!   prefixes, a cheap uniformity smoke signal;
//! - a strict-avalanche bias matrix (flip one input bit, count output bit
//!   flips) for the dispatched mixer.
//!
//! Build with: `cargo run --bin analyze --features analyze --release -- [OPTIONS]`

use clap::Parser;
use mixperm::Perm64;
use rayon::prelude::*;

/// CLI arguments for the dispersion probe.
#[derive(Parser, Debug)]
#[command(name = "analyze")]
struct Args {
    /// Domain size (signed encoding: -1 is the full 64-bit word domain)
    #[arg(short = 'n', long, default_value_t = 1 << 20)]
    size: i64,

    /// Mixing rounds (0 = variant default)
    #[arg(short = 'r', long, default_value_t = 0)]
    rounds: i32,

    /// Number of seeds to probe
    #[arg(long, default_value_t = 64)]
    num_seeds: u64,

    /// Inputs sampled per seed. Capped at the domain size.
    #[arg(long, default_value_t = 10_000)]
    num_inputs: u64,

    /// Base RNG seed (random if not specified)
    #[arg(long)]
    seed: Option<u64>,

    /// Also compute the 64x64 avalanche bias matrix (slow)
    #[arg(long)]
    avalanche: bool,
}

/// Cardinality of the probed domain, as a float for the z-score math.
fn domain_cardinality(size: i64) -> f64 {
    match size {
        -1 => 2f64.powi(64),
        s if s < 0 => s as u64 as f64,
        s => s as f64,
    }
}

/// z-score of the sample mean of `encode(0..m)` against the uniform mean.
fn mean_z(perm: &Perm64, m: u64, domain: f64) -> f64 {
    let mut sum = 0.0;
    for x in 0..m {
        sum += (perm.encode_unchecked(x as i64) as u64) as f64;
    }
    let mean = sum / m as f64;
    let expected = (domain - 1.0) / 2.0;
    let sigma = domain / 12f64.sqrt();
    (mean - expected) / (sigma / (m as f64).sqrt())
}

/// Mean and max avalanche bias of `encode` over `num_inputs` sequential
/// inputs: entry `[b][j]` of the flip matrix counts how often output bit j
/// flipped when input bit b was flipped.
fn avalanche(perm: &Perm64, num_inputs: u64) -> (f64, f64) {
    let mut flip_count = vec![[0u64; 64]; 64];

    for x in 0..num_inputs {
        let fx = perm.encode_unchecked(x as i64) as u64;
        for (b, row) in flip_count.iter_mut().enumerate() {
            let flipped = perm.encode_unchecked((x ^ (1u64 << b)) as i64) as u64;
            let diff = fx ^ flipped;
            for (j, cell) in row.iter_mut().enumerate() {
                *cell += (diff >> j) & 1;
            }
        }
    }

    let mut sum_bias = 0.0;
    let mut max_bias: f64 = 0.0;
    for row in &flip_count {
        for &count in row {
            let bias = (count as f64 / num_inputs as f64 - 0.5).abs();
            sum_bias += bias;
            max_bias = max_bias.max(bias);
        }
    }
    (sum_bias / (64.0 * 64.0), max_bias)
}

fn main() {
    let args = Args::parse();

    let base_seed = match args.seed {
        Some(seed) => seed,
        None => {
            let mut buf = [0u8; 8];
            getrandom::fill(&mut buf).expect("failed to get random seed");
            u64::from_le_bytes(buf)
        }
    };

    let domain = domain_cardinality(args.size);
    let samples = (args.num_inputs as f64).min(domain) as u64;

    let probe = Perm64::from_seed(args.size, base_seed, args.rounds).expect("invalid configuration");
    eprintln!(
        "size={} variant={:?} rounds={} seeds={} samples={} base_seed={:#x}",
        args.size,
        probe.variant(),
        probe.rounds(),
        args.num_seeds,
        samples,
        base_seed
    );

    let scores: Vec<f64> = (0..args.num_seeds)
        .into_par_iter()
        .map(|i| {
            let perm = Perm64::from_seed(args.size, base_seed.wrapping_add(i), args.rounds)
                .expect("invalid configuration");
            mean_z(&perm, samples, domain)
        })
        .collect();

    let worst = scores.iter().fold(0.0f64, |acc, z| acc.max(z.abs()));
    let mean_abs = scores.iter().map(|z| z.abs()).sum::<f64>() / scores.len() as f64;
    let beyond_3 = scores.iter().filter(|z| z.abs() > 3.0).count();

    println!("mean |z| = {mean_abs:.3}");
    println!("max  |z| = {worst:.3}");
    println!(
        "|z| > 3  = {}/{} ({:.1}% expected ~0.3% for uniform)",
        beyond_3,
        scores.len(),
        100.0 * beyond_3 as f64 / scores.len() as f64
    );

    if args.avalanche {
        if args.size != -1 {
            eprintln!("avalanche needs the full word domain (-n -1): a bit flip must stay inside the domain");
        } else {
            eprintln!("computing avalanche matrix over {samples} inputs...");
            let (mean_bias, max_bias) = avalanche(&probe, samples);
            println!("avalanche mean bias = {mean_bias:.5}");
            println!("avalanche max  bias = {max_bias:.5}");
        }
    }
}
