//! Computes the per-day `alpha_1..alpha_20` files from level-5 tick data.
//!
//! Each `<input>/<YYYYMMDD or MMDD>/` directory (CSV files at any depth)
//! becomes `<out>/<MMDD>.csv`, ready to be scored by `alpha-check`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use alpha_check::factor::driver::{compute_dates, Selection};

#[derive(Debug, Parser)]
#[command(
    name = "compute_factors",
    about = "Compute cross-sectional order-book factors per trade time"
)]
struct Args {
    /// Directory holding one subdirectory of tick CSVs per trading day.
    #[arg(long)]
    input: PathBuf,

    /// Directory the `<MMDD>.csv` factor files are written to.
    #[arg(long)]
    out: PathBuf,

    /// Only process this date directory (name or MMDD); repeat for several.
    #[arg(long = "date", value_name = "DATE")]
    dates: Vec<String>,

    /// Process at most this many dates, in name order.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let selection = Selection {
        dates: args.dates,
        limit: args.limit,
    };

    let written = compute_dates(&args.input, &args.out, &selection)
        .with_context(|| format!("computing factors from {}", args.input.display()))?;

    let ticks: usize = written.iter().map(|d| d.stats.scored).sum();
    println!(
        "Wrote {} day(s) from {} tick(s) to {}",
        written.len(),
        ticks,
        args.out.display()
    );
    Ok(())
}
