use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::RunConfig;
use crate::data::loader::{load_day, LoadError};
use crate::data::model::{ColumnError, DateKey, DayTable, TimeLabel};

// ---------------------------------------------------------------------------
// Error metric
// ---------------------------------------------------------------------------

/// `|standard - eval| / |standard + epsilon|`.
///
/// `epsilon` is added, not max'ed, so a standard value near zero still
/// yields a finite but possibly large error.
pub fn relative_error(standard: f64, eval: f64, epsilon: f64) -> f64 {
    (standard - eval).abs() / (standard + epsilon).abs()
}

/// Arithmetic mean; NaN for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Strict comparison: a mean equal to the threshold fails, as does NaN.
pub fn passes(mean_error: f64, threshold: f64) -> bool {
    mean_error < threshold
}

// ---------------------------------------------------------------------------
// Day pair: the two aligned tables for one date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Standard,
    Eval,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Standard => write!(f, "standard"),
            Side::Eval => write!(f, "eval"),
        }
    }
}

/// Why a date could not be scored for any column.
#[derive(Debug, Error)]
pub enum DayError {
    #[error("{side} table: {source}")]
    Load {
        side: Side,
        #[source]
        source: LoadError,
    },
    #[error("row count differs: standard has {standard}, eval has {eval}")]
    RowCount { standard: usize, eval: usize },
    #[error("standard label {0} has no eval row")]
    UnmatchedLabel(TimeLabel),
    #[error("{side} table repeats label {label} and the two indexes differ")]
    RepeatedLabel { side: Side, label: TimeLabel },
}

/// Why one (column, date) unit could not be scored.
#[derive(Debug, Error)]
#[error("{side} table: {source}")]
pub struct ColumnFailure {
    pub side: Side,
    #[source]
    pub source: ColumnError,
}

/// Standard and eval tables for one date, with identical row labels.
#[derive(Debug, Clone)]
pub struct DayPair {
    pub standard: DayTable,
    pub eval: DayTable,
}

impl DayPair {
    /// Pair two filtered tables row by row on their labels.
    ///
    /// Identical indexes pair positionally, repeated labels included.
    /// Otherwise both indexes must hold the same unique labels, and eval is
    /// reordered to follow standard.
    pub fn align(standard: DayTable, eval: DayTable) -> Result<Self, DayError> {
        if standard.len() != eval.len() {
            return Err(DayError::RowCount {
                standard: standard.len(),
                eval: eval.len(),
            });
        }
        if standard.index == eval.index {
            return Ok(DayPair { standard, eval });
        }

        let mut seen = HashSet::with_capacity(standard.len());
        if let Some(label) = standard.index.iter().find(|l| !seen.insert(*l)) {
            return Err(DayError::RepeatedLabel {
                side: Side::Standard,
                label: label.clone(),
            });
        }
        let mut eval_rows: HashMap<&TimeLabel, usize> = HashMap::with_capacity(eval.len());
        for (row, label) in eval.index.iter().enumerate() {
            if eval_rows.insert(label, row).is_some() {
                return Err(DayError::RepeatedLabel {
                    side: Side::Eval,
                    label: label.clone(),
                });
            }
        }

        let order = standard
            .index
            .iter()
            .map(|label| {
                eval_rows
                    .get(label)
                    .copied()
                    .ok_or_else(|| DayError::UnmatchedLabel(label.clone()))
            })
            .collect::<Result<Vec<usize>, DayError>>()?;
        log::debug!("eval rows reordered to match standard index");

        let eval = eval.take_rows(&order);
        Ok(DayPair { standard, eval })
    }

    /// Mean relative error of `column` over every row of the day.
    pub fn column_error(&self, column: &str, epsilon: f64) -> Result<f64, ColumnFailure> {
        let standard = self.standard.numeric(column).map_err(|source| ColumnFailure {
            side: Side::Standard,
            source,
        })?;
        let eval = self.eval.numeric(column).map_err(|source| ColumnFailure {
            side: Side::Eval,
            source,
        })?;

        Ok(mean(
            standard
                .iter()
                .zip(eval)
                .map(|(&s, &e)| relative_error(s, e, epsilon)),
        ))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One date's mean relative error for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSample {
    pub date: DateKey,
    pub error: f64,
}

/// A (column, date) unit that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    pub date: DateKey,
    pub reason: String,
}

/// Outcome for one column across every date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnVerdict {
    pub column: String,
    /// Mean of the successful samples; `None` when no date could be scored.
    pub mean_error: Option<f64>,
    pub passed: bool,
    pub samples: Vec<DateSample>,
    pub failures: Vec<UnitFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub threshold: f64,
    pub epsilon: f64,
    pub dates: Vec<DateKey>,
    pub columns: Vec<ColumnVerdict>,
}

impl Scorecard {
    /// Number of (column, date) units that could not be scored.
    pub fn failure_count(&self) -> usize {
        self.columns.iter().map(|c| c.failures.len()).sum()
    }

    pub fn passed_count(&self) -> usize {
        self.columns.iter().filter(|c| c.passed).count()
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Runs one comparison over every configured column and date.
pub struct Scorer<'a> {
    config: &'a RunConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Scorer { config }
    }

    /// Load and align both tables for `date`.
    pub fn load_pair(&self, date: &DateKey) -> Result<DayPair, DayError> {
        let window = &self.config.window;
        let standard = load_day(&self.config.standard_dir, date, window).map_err(|source| {
            DayError::Load {
                side: Side::Standard,
                source,
            }
        })?;
        let eval = load_day(&self.config.eval_dir, date, window).map_err(|source| {
            DayError::Load {
                side: Side::Eval,
                source,
            }
        })?;
        DayPair::align(standard, eval)
    }

    /// Score every column. Each date is loaded once; a failing date or
    /// column only affects its own units.
    pub fn run(&self) -> Scorecard {
        let days: Vec<(&DateKey, Result<DayPair, DayError>)> = self
            .config
            .dates
            .iter()
            .map(|date| {
                let pair = self.load_pair(date);
                if let Err(e) = &pair {
                    log::warn!("{date}: {e}");
                }
                (date, pair)
            })
            .collect();

        let columns = self
            .config
            .columns
            .iter()
            .map(|column| self.score_column(column, &days))
            .collect();

        Scorecard {
            threshold: self.config.threshold,
            epsilon: self.config.epsilon,
            dates: self.config.dates.clone(),
            columns,
        }
    }

    fn score_column(
        &self,
        column: &str,
        days: &[(&DateKey, Result<DayPair, DayError>)],
    ) -> ColumnVerdict {
        let mut samples = Vec::new();
        let mut failures = Vec::new();

        for (date, pair) in days {
            let outcome = match pair {
                Ok(pair) => pair
                    .column_error(column, self.config.epsilon)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match outcome {
                Ok(error) => {
                    log::debug!("{column} @ {date}: mean relative error {error:.6e}");
                    samples.push(DateSample {
                        date: (*date).clone(),
                        error,
                    });
                }
                Err(reason) => failures.push(UnitFailure {
                    date: (*date).clone(),
                    reason,
                }),
            }
        }

        let mean_error = if samples.is_empty() {
            None
        } else {
            Some(mean(samples.iter().map(|s| s.error)))
        };
        let passed = mean_error.is_some_and(|m| passes(m, self.config.threshold));

        match mean_error {
            Some(m) => log::info!(
                "{column}: mean relative error {m:.6e} over {} date(s)",
                samples.len()
            ),
            None => log::info!("{column}: no date could be scored"),
        }

        ColumnVerdict {
            column: column.to_string(),
            mean_error,
            passed,
            samples,
            failures,
        }
    }
}
