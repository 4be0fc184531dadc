use std::path::{Path, PathBuf};

use thiserror::Error;

use super::filter::SessionWindow;
use super::model::{ColumnData, DateKey, DayTable, LabelError, TimeLabel};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("reading {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: header row is empty", .0.display())]
    EmptyHeader(PathBuf),
    #[error("{}, row {row}: {source}", .path.display())]
    MalformedIndex {
        path: PathBuf,
        row: usize,
        #[source]
        source: LabelError,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Path of the daily file for `date` under `dir`.
pub fn day_path(dir: &Path, date: &DateKey) -> PathBuf {
    dir.join(format!("{date}.csv"))
}

/// Load `<dir>/<date>.csv` and keep only the rows inside `window`.
pub fn load_day(dir: &Path, date: &DateKey, window: &SessionWindow) -> Result<DayTable, LoadError> {
    let path = day_path(dir, date);
    let table = read_table(&path)?;
    let filtered = window.apply(&table);

    log::debug!(
        "{}: kept {} of {} rows ({} columns) in {}..={}",
        path.display(),
        filtered.len(),
        table.len(),
        table.columns.len(),
        window.start,
        window.end
    );

    Ok(filtered)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row, first column the time index, every other column
/// a named value column. Every record must have as many fields as the
/// header. Repeated labels are kept; pairing them up is the scorer's job.
pub fn read_table(path: &Path) -> Result<DayTable, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::EmptyHeader(path.to_path_buf()));
    }

    let mut index = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len() - 1];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;

        let raw_label = record.get(0).unwrap_or("");
        let label = TimeLabel::normalize(raw_label).map_err(|source| LoadError::MalformedIndex {
            path: path.to_path_buf(),
            row: row_no,
            source,
        })?;
        index.push(label);

        for (col, value) in record.iter().skip(1).enumerate() {
            cells[col].push(value.to_string());
        }
    }

    let columns: Vec<(String, ColumnData)> = headers
        .into_iter()
        .skip(1)
        .zip(cells)
        .map(|(name, col)| (name, ColumnData::from_cells(col)))
        .collect();

    Ok(DayTable::new(index, columns))
}
