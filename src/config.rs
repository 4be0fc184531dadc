use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::data::filter::{SessionWindow, SESSION_END, SESSION_START};
use crate::data::model::{DateKey, DateKeyError, LabelError, TimeLabel};

/// Dates scored when none are given.
pub const DEFAULT_DATES: [&str; 5] = ["0102", "0103", "0104", "0105", "0108"];
pub const DEFAULT_COLUMN_PREFIX: &str = "alpha_";
pub const DEFAULT_COLUMN_COUNT: usize = 20;
/// A column passes when its mean relative error is strictly below this.
pub const DEFAULT_THRESHOLD: f64 = 0.01;
/// Additive stabilizer in the relative-error denominator.
pub const DEFAULT_EPSILON: f64 = 1e-7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {0} directory given")]
    MissingDir(&'static str),
    #[error("{which} directory {} does not exist or is not a directory", .path.display())]
    NotADirectory { which: &'static str, path: PathBuf },
    #[error("no dates to score")]
    NoDates,
    #[error(transparent)]
    BadDate(#[from] DateKeyError),
    #[error("column count must be at least 1")]
    NoColumns,
    #[error("threshold must be a positive finite number, got {0}")]
    BadThreshold(f64),
    #[error("epsilon must be a non-negative finite number, got {0}")]
    BadEpsilon(f64),
    #[error("session bound: {0}")]
    BadWindowBound(#[from] LabelError),
    #[error("session start {start} is after session end {end}")]
    InvertedWindow { start: TimeLabel, end: TimeLabel },
}

// ---------------------------------------------------------------------------
// ConfigLayer – partial settings from one source
// ---------------------------------------------------------------------------

/// One source of settings (CLI flags or a JSON file). Unset fields fall
/// through to the next layer, then to the defaults.
///
/// ```json
/// {
///   "dates": ["0102", "0103"],
///   "standard_dir": "/data/standard",
///   "eval_dir": "/data/mine",
///   "threshold": 0.01
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub dates: Option<Vec<String>>,
    pub standard_dir: Option<PathBuf>,
    pub eval_dir: Option<PathBuf>,
    pub column_prefix: Option<String>,
    pub column_count: Option<usize>,
    pub threshold: Option<f64>,
    pub epsilon: Option<f64>,
    pub session_start: Option<String>,
    pub session_end: Option<String>,
}

impl ConfigLayer {
    /// Read a layer from a JSON file. Relative `standard_dir` and `eval_dir`
    /// values are taken relative to the file's own directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let layer: ConfigLayer = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(ConfigLayer {
            standard_dir: layer.standard_dir.map(|d| rebase(base, d)),
            eval_dir: layer.eval_dir.map(|d| rebase(base, d)),
            ..layer
        })
    }

    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            dates: self.dates.or(lower.dates),
            standard_dir: self.standard_dir.or(lower.standard_dir),
            eval_dir: self.eval_dir.or(lower.eval_dir),
            column_prefix: self.column_prefix.or(lower.column_prefix),
            column_count: self.column_count.or(lower.column_count),
            threshold: self.threshold.or(lower.threshold),
            epsilon: self.epsilon.or(lower.epsilon),
            session_start: self.session_start.or(lower.session_start),
            session_end: self.session_end.or(lower.session_end),
        }
    }
}

// ---------------------------------------------------------------------------
// RunConfig – validated inputs for one scoring run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub dates: Vec<DateKey>,
    pub standard_dir: PathBuf,
    pub eval_dir: PathBuf,
    /// Columns to score, in report order.
    pub columns: Vec<String>,
    pub threshold: f64,
    pub epsilon: f64,
    pub window: SessionWindow,
}

impl RunConfig {
    /// Apply defaults to `layer` and validate the result. Nothing is loaded
    /// until this has succeeded.
    pub fn resolve(layer: ConfigLayer) -> Result<Self, ConfigError> {
        let standard_dir = require_dir("standard", layer.standard_dir)?;
        let eval_dir = require_dir("eval", layer.eval_dir)?;

        let dates: Vec<DateKey> = match layer.dates {
            Some(raw) => raw
                .iter()
                .map(|d| d.parse())
                .collect::<Result<_, DateKeyError>>()?,
            None => DEFAULT_DATES
                .iter()
                .map(|d| d.parse())
                .collect::<Result<_, DateKeyError>>()?,
        };
        if dates.is_empty() {
            return Err(ConfigError::NoDates);
        }

        let count = layer.column_count.unwrap_or(DEFAULT_COLUMN_COUNT);
        if count == 0 {
            return Err(ConfigError::NoColumns);
        }
        let prefix = layer
            .column_prefix
            .unwrap_or_else(|| DEFAULT_COLUMN_PREFIX.to_string());
        let columns = (1..=count).map(|i| format!("{prefix}{i}")).collect();

        let threshold = layer.threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::BadThreshold(threshold));
        }
        let epsilon = layer.epsilon.unwrap_or(DEFAULT_EPSILON);
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::BadEpsilon(epsilon));
        }

        let window = SessionWindow::parse(
            layer.session_start.as_deref().unwrap_or(SESSION_START),
            layer.session_end.as_deref().unwrap_or(SESSION_END),
        )?;
        if window.start > window.end {
            return Err(ConfigError::InvertedWindow {
                start: window.start,
                end: window.end,
            });
        }

        Ok(RunConfig {
            dates,
            standard_dir,
            eval_dir,
            columns,
            threshold,
            epsilon,
            window,
        })
    }
}

fn rebase(base: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_relative() && !dir.as_os_str().is_empty() {
        base.join(dir)
    } else {
        dir
    }
}

fn require_dir(which: &'static str, dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = match dir {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => return Err(ConfigError::MissingDir(which)),
    };
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory { which, path: dir });
    }
    Ok(dir)
}
