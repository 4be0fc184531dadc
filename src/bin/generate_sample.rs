//! Writes a synthetic `standard/` and `eval/` pair of daily alpha files.
//!
//! Eval values are the standard values with multiplicative noise whose level
//! grows with the column number, so low columns pass and high ones fail.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

const DATES: [&str; 5] = ["0102", "0103", "0104", "0105", "0108"];
const COLUMNS: usize = 20;

#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory; `standard/` and `eval/` are created inside it.
    #[arg(long, default_value = "sample_data")]
    out: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Minute labels from 09:15 to 15:00, written without zero padding the way
/// an integer index is usually exported (`91500`, ..., `150000`).
fn minute_labels() -> Vec<String> {
    let mut labels = Vec::new();
    for minute in (9 * 60 + 15)..=(15 * 60) {
        labels.push(format!("{}", (minute / 60) * 10000 + (minute % 60) * 100));
    }
    labels
}

fn write_day(path: &Path, labels: &[String], rows: &[Vec<f64>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![String::new()];
    header.extend((1..=COLUMNS).map(|i| format!("alpha_{i}")));
    writer.write_record(&header)?;

    for (label, row) in labels.iter().zip(rows) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(|v| format!("{v:.8}")));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let standard_dir = args.out.join("standard");
    let eval_dir = args.out.join("eval");
    fs::create_dir_all(&standard_dir).context("creating standard directory")?;
    fs::create_dir_all(&eval_dir).context("creating eval directory")?;

    let labels = minute_labels();
    for date in DATES {
        let standard: Vec<Vec<f64>> = labels
            .iter()
            .map(|_| (0..COLUMNS).map(|_| rng.gauss(1.0, 0.25)).collect())
            .collect();

        // alpha_i gets noise with std dev i * 0.1%, so roughly the first twelve pass.
        let eval: Vec<Vec<f64>> = standard
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(col, v)| v * (1.0 + rng.gauss(0.0, (col + 1) as f64 * 0.001)))
                    .collect()
            })
            .collect();

        write_day(&standard_dir.join(format!("{date}.csv")), &labels, &standard)?;
        write_day(&eval_dir.join(format!("{date}.csv")), &labels, &eval)?;
    }

    println!(
        "Wrote {} days x {} rows to {} and {}",
        DATES.len(),
        labels.len(),
        standard_dir.display(),
        eval_dir.display()
    );
    Ok(())
}
