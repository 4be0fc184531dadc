use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::formulas::{compute, Factors, FACTOR_COUNT};
use super::tick::{is_trading_time, PrevTick, Skip, Tick};
use super::FactorError;

/// Record counters for one run of the engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Records read, header lines excluded.
    pub records: usize,
    /// Ticks that contributed factors.
    pub scored: usize,
    pub outside_session: usize,
    /// Short records and records with a non-integer trade time.
    pub malformed: usize,
}

/// Cross-sectional mean of every factor at one trade time.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    pub trade_time: i64,
    pub values: Factors,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sums: Factors,
    count: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator {
            sums: [0.0; FACTOR_COUNT],
            count: 0,
        }
    }
}

/// Streams ticks for one date and averages their factors by trade time.
///
/// Ticks of one stock must arrive in time order; the change factors compare
/// each tick with the last in-session tick of the same stock and day.
#[derive(Debug, Default)]
pub struct FactorEngine {
    previous: HashMap<(String, String), PrevTick>,
    by_time: BTreeMap<i64, Accumulator>,
    stats: TickStats,
}

impl FactorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw record.
    pub fn push_fields(&mut self, fields: &[&str]) {
        match Tick::from_fields(fields) {
            Ok(tick) => {
                self.stats.records += 1;
                self.push(&tick);
            }
            Err(Skip::Header) => {}
            Err(skip) => {
                self.stats.records += 1;
                self.stats.malformed += 1;
                if self.stats.malformed <= 10 {
                    log::debug!("skipping record {}: {skip:?}", self.stats.records);
                }
            }
        }
    }

    /// Feed one parsed tick. Ticks outside the trading session are counted
    /// and dropped without touching the previous-tick state.
    pub fn push(&mut self, tick: &Tick) {
        if !is_trading_time(tick.trade_time) {
            self.stats.outside_session += 1;
            return;
        }

        let key = tick.stream_key();
        let factors = compute(tick, self.previous.get(&key));
        self.previous.insert(key, PrevTick::from(tick));

        let acc = self.by_time.entry(tick.trade_time).or_default();
        for (sum, value) in acc.sums.iter_mut().zip(factors) {
            *sum += value;
        }
        acc.count += 1;
        self.stats.scored += 1;
    }

    /// Feed every record of a headerless-or-headed tick CSV.
    pub fn read_file(&mut self, path: &Path) -> Result<(), FactorError> {
        let csv_err = |source: csv::Error| FactorError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_err)?;

        let before = self.stats.records;
        for result in reader.records() {
            let record = result.map_err(csv_err)?;
            let fields: Vec<&str> = record.iter().collect();
            self.push_fields(&fields);
        }
        log::debug!(
            "{}: {} record(s)",
            path.display(),
            self.stats.records - before
        );
        Ok(())
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// One row per trade time, in ascending time order.
    pub fn finish(self) -> Vec<FactorRow> {
        self.by_time
            .into_iter()
            .map(|(trade_time, acc)| FactorRow {
                trade_time,
                values: acc.sums.map(|s| s / acc.count as f64),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// One date directory
// ---------------------------------------------------------------------------

/// Every `*.csv` under `dir`, at any depth, in path order.
pub fn tick_files(dir: &Path) -> Result<Vec<PathBuf>, FactorError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let io_err = |source| FactorError::Io {
            path: current.clone(),
            source,
        };
        for entry in std::fs::read_dir(&current).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Compute the factor rows for every tick file under `dir`.
pub fn compute_day(dir: &Path) -> Result<(Vec<FactorRow>, TickStats), FactorError> {
    let mut engine = FactorEngine::new();
    for file in tick_files(dir)? {
        engine.read_file(&file)?;
    }
    let stats = engine.stats();
    Ok((engine.finish(), stats))
}
