use std::path::{Path, PathBuf};

use super::engine::{compute_day, TickStats};
use super::output::write_day;
use super::FactorError;
use crate::data::loader::day_path;
use crate::data::model::DateKey;

/// A tick directory for one trading day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDir {
    /// Directory name, `YYYYMMDD` or `MMDD`.
    pub name: String,
    pub path: PathBuf,
    /// Stem of the output file.
    pub key: DateKey,
}

/// Summary of one written day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutput {
    pub key: DateKey,
    pub path: PathBuf,
    pub rows: usize,
    pub stats: TickStats,
}

/// Subdirectories of `base` named with four or eight digits, sorted by name.
pub fn date_dirs(base: &Path) -> Result<Vec<DateDir>, FactorError> {
    if !base.is_dir() {
        return Err(FactorError::MissingInput(base.to_path_buf()));
    }
    let io_err = |source| FactorError::Io {
        path: base.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(base).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_dir() || !is_date_name(name) {
            continue;
        }
        let key = name[name.len() - 4..]
            .parse()
            .map_err(|source| FactorError::BadDateDir {
                dir: name.to_string(),
                source,
            })?;
        dirs.push(DateDir {
            name: name.to_string(),
            path: path.clone(),
            key,
        });
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

fn is_date_name(name: &str) -> bool {
    matches!(name.len(), 4 | 8) && name.bytes().all(|b| b.is_ascii_digit())
}

/// Which date directories to process.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Directory names or `MMDD` keys; empty selects every date.
    pub dates: Vec<String>,
    /// Process at most this many of the selected dates.
    pub limit: Option<usize>,
}

impl Selection {
    fn apply(&self, dirs: Vec<DateDir>) -> Vec<DateDir> {
        let picked = dirs.into_iter().filter(|d| {
            self.dates.is_empty()
                || self
                    .dates
                    .iter()
                    .any(|want| *want == d.name || want == d.key.as_str())
        });
        match self.limit {
            Some(n) => picked.take(n).collect(),
            None => picked.collect(),
        }
    }
}

/// Compute and write `<out>/<MMDD>.csv` for each selected date under `input`.
pub fn compute_dates(
    input: &Path,
    out: &Path,
    selection: &Selection,
) -> Result<Vec<DayOutput>, FactorError> {
    let dirs = selection.apply(date_dirs(input)?);
    if dirs.is_empty() {
        return Err(FactorError::NoDates(input.to_path_buf()));
    }
    std::fs::create_dir_all(out).map_err(|source| FactorError::Io {
        path: out.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let (rows, stats) = compute_day(&dir.path)?;
        if rows.is_empty() {
            log::warn!("{}: no in-session ticks", dir.path.display());
        }
        let path = day_path(out, &dir.key);
        write_day(&path, &rows)?;
        log::info!(
            "{} -> {}: {} time(s) from {} tick(s), {} outside session, {} malformed",
            dir.name,
            path.display(),
            rows.len(),
            stats.scored,
            stats.outside_session,
            stats.malformed
        );
        written.push(DayOutput {
            key: dir.key,
            path,
            rows: rows.len(),
            stats,
        });
    }
    Ok(written)
}
