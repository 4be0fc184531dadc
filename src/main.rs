use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use alpha_check::config::{ConfigLayer, RunConfig};
use alpha_check::report;
use alpha_check::score::Scorer;

#[derive(Debug, Parser)]
#[command(
    name = "alpha-check",
    about = "Check that evaluated alpha predictions match a reference within tolerance"
)]
struct Args {
    /// Directory holding the reference `<MMDD>.csv` files.
    #[arg(long = "standard")]
    standard_dir: Option<PathBuf>,

    /// Directory holding the `<MMDD>.csv` files to check.
    #[arg(long = "eval")]
    eval_dir: Option<PathBuf>,

    /// Date to score (MMDD); repeat for several. Defaults to 0102 0103 0104 0105 0108.
    #[arg(long = "date", value_name = "MMDD")]
    dates: Vec<String>,

    /// JSON file with any of the settings below; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of columns to score (prefix1 ..= prefixN).
    #[arg(long = "columns", value_name = "N")]
    column_count: Option<usize>,

    /// Column name prefix.
    #[arg(long)]
    column_prefix: Option<String>,

    /// A column passes when its mean relative error is strictly below this.
    #[arg(long)]
    threshold: Option<f64>,

    /// Stabilizer added to the standard value in the denominator.
    #[arg(long)]
    epsilon: Option<f64>,

    /// First time label kept (inclusive), HHMMSS.
    #[arg(long, value_name = "HHMMSS")]
    session_start: Option<String>,

    /// Last time label kept (inclusive), HHMMSS.
    #[arg(long, value_name = "HHMMSS")]
    session_end: Option<String>,

    /// Also write the full scorecard as JSON to this path.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

impl Args {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            dates: (!self.dates.is_empty()).then(|| self.dates.clone()),
            standard_dir: self.standard_dir.clone(),
            eval_dir: self.eval_dir.clone(),
            column_prefix: self.column_prefix.clone(),
            column_count: self.column_count,
            threshold: self.threshold,
            epsilon: self.epsilon,
            session_start: self.session_start.clone(),
            session_end: self.session_end.clone(),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args = Args::parse();

    let mut layer = args.layer();
    if let Some(path) = &args.config {
        layer = layer.or(ConfigLayer::from_json_file(path)?);
    }
    let config = RunConfig::resolve(layer).context("invalid configuration")?;
    log::info!(
        "scoring {} column(s) over {} date(s): {} vs {}",
        config.columns.len(),
        config.dates.len(),
        config.standard_dir.display(),
        config.eval_dir.display()
    );

    let card = Scorer::new(&config).run();

    report::write_verdicts(&card, &mut io::stdout().lock()).context("writing results")?;
    report::write_failures(&card, &mut io::stderr().lock()).context("writing failures")?;
    if let Some(path) = &args.json {
        report::save_json(&card, path)?;
        log::info!("wrote scorecard to {}", path.display());
    }

    let failures = card.failure_count();
    if failures > 0 {
        log::error!(
            "{failures} column/date unit(s) could not be scored; {} of {} column(s) passed",
            card.passed_count(),
            card.columns.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
