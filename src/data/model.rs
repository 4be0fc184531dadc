use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Width of a normalized time label (`HHMMSS`).
pub const LABEL_WIDTH: usize = 6;

// ---------------------------------------------------------------------------
// TimeLabel – normalized row index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index value '{raw}' does not normalize to a {LABEL_WIDTH}-digit time label")]
pub struct LabelError {
    pub raw: String,
}

/// A time-of-day row label, always six ASCII digits (`"093000"`).
///
/// Because the width is fixed and the content numeric, the derived
/// lexicographic ordering is also chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeLabel(pub(super) String);

impl TimeLabel {
    /// Normalize a raw index cell.
    ///
    /// Integral numeric text (`93000`, `093000`, `93000.0`) is rendered as
    /// its integer first, then left-padded with zeros to [`LABEL_WIDTH`].
    pub fn normalize(raw: &str) -> Result<Self, LabelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LabelError {
                raw: raw.to_string(),
            });
        }
        let rendered = if let Ok(i) = trimmed.parse::<i64>() {
            i.to_string()
        } else {
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
                _ => trimmed.to_string(),
            }
        };

        let padded = format!("{rendered:0>width$}", width = LABEL_WIDTH);
        if padded.len() == LABEL_WIDTH && padded.bytes().all(|b| b.is_ascii_digit()) {
            Ok(TimeLabel(padded))
        } else {
            Err(LabelError {
                raw: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TimeLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeLabel::normalize(s)
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DateKey – `MMDD` file stem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("date key '{0}' is not a valid MMDD value")]
pub struct DateKeyError(pub String);

/// Month+day key naming one daily file, e.g. `"0102"` for `0102.csv`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DateKeyError(s.to_string());
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let month: u32 = s[..2].parse().map_err(|_| err())?;
        let day: u32 = s[2..].parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(err());
        }
        Ok(DateKey(s.to_string()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ColumnData – one column of a day table
// ---------------------------------------------------------------------------

/// Column values, typed once at load time.
///
/// A column is numeric when every cell parses as `f64`; empty cells count
/// as NaN. Anything else is kept as text so unrelated columns never block
/// scoring of the numeric ones.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    /// Type a column from its raw cells.
    pub fn from_cells(cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells.iter().map(|c| parse_cell(c)).collect();
        match parsed {
            Some(values) => ColumnData::Numeric(values),
            None => ColumnData::Text(cells),
        }
    }

    /// Keep only the rows whose positions are listed in `rows`.
    fn select(&self, rows: &[usize]) -> Self {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// DayTable – one loaded `<date>.csv`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column '{0}' not found")]
    Missing(String),
    #[error("column '{column}' is not numeric (cell '{cell}')")]
    NotNumeric { column: String, cell: String },
}

/// A row-indexed table: one row per time label, columns by name.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTable {
    /// Row labels, in file order.
    pub index: Vec<TimeLabel>,
    /// Ordered (name, data) pairs, excluding the index column.
    pub columns: Vec<(String, ColumnData)>,
}

impl DayTable {
    pub fn new(index: Vec<TimeLabel>, columns: Vec<(String, ColumnData)>) -> Self {
        DayTable { index, columns }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Numeric values of a named column.
    pub fn numeric(&self, name: &str) -> Result<&[f64], ColumnError> {
        match self.columns.iter().find(|(n, _)| n == name) {
            Some((_, ColumnData::Numeric(values))) => Ok(values.as_slice()),
            Some((_, ColumnData::Text(cells))) => Err(ColumnError::NotNumeric {
                column: name.to_string(),
                cell: cells
                    .iter()
                    .find(|c| parse_cell(c).is_none())
                    .cloned()
                    .unwrap_or_default(),
            }),
            None => Err(ColumnError::Missing(name.to_string())),
        }
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows(&self, mut keep: impl FnMut(&TimeLabel) -> bool) -> DayTable {
        let rows: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, label)| keep(*label))
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&rows)
    }

    /// Build a table from the rows at `rows`, in that order.
    pub fn take_rows(&self, rows: &[usize]) -> DayTable {
        DayTable {
            index: rows.iter().map(|&i| self.index[i].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, data)| (name.clone(), data.select(rows)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> TimeLabel {
        TimeLabel::normalize(s).unwrap()
    }

    #[test]
    fn normalize_pads_integer_labels() {
        assert_eq!(label("93000").as_str(), "093000");
        assert_eq!(label("093000").as_str(), "093000");
        assert_eq!(label("145700").as_str(), "145700");
        assert_eq!(label(" 100000 ").as_str(), "100000");
        assert_eq!(label("0").as_str(), "000000");
    }

    #[test]
    fn normalize_accepts_integral_floats() {
        assert_eq!(label("93000.0").as_str(), "093000");
    }

    #[test]
    fn normalize_rejects_non_labels() {
        for raw in ["09:30:00", "1234567", "-5", "abc", "9300.5", ""] {
            assert!(TimeLabel::normalize(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn labels_order_chronologically() {
        let mut labels = vec![label("130000"), label("93000"), label("100500")];
        labels.sort();
        let sorted: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(sorted, ["093000", "100500", "130000"]);
    }

    #[test]
    fn date_keys() {
        for ok in ["0102", "0108", "1231"] {
            assert_eq!(ok.parse::<DateKey>().unwrap().as_str(), ok);
        }
        for bad in ["102", "01022", "0002", "1301", "0100", "01a2", ""] {
            assert!(bad.parse::<DateKey>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn column_typing() {
        let numeric = ColumnData::from_cells(vec!["1.5".into(), "".into(), "-2".into()]);
        match numeric {
            ColumnData::Numeric(v) => {
                assert_eq!(v[0], 1.5);
                assert!(v[1].is_nan());
                assert_eq!(v[2], -2.0);
            }
            other => panic!("expected numeric, got {other:?}"),
        }

        let text = ColumnData::from_cells(vec!["1.5".into(), "x".into()]);
        assert!(matches!(text, ColumnData::Text(_)));
    }

    #[test]
    fn numeric_lookup_errors() {
        let table = DayTable::new(
            vec![label("100000")],
            vec![
                ("alpha_1".into(), ColumnData::Numeric(vec![1.0])),
                ("note".into(), ColumnData::Text(vec!["x".into()])),
            ],
        );
        assert_eq!(table.numeric("alpha_1").unwrap(), &[1.0]);
        assert_eq!(
            table.numeric("note"),
            Err(ColumnError::NotNumeric {
                column: "note".into(),
                cell: "x".into()
            })
        );
        assert_eq!(
            table.numeric("alpha_2"),
            Err(ColumnError::Missing("alpha_2".into()))
        );
    }

    #[test]
    fn retain_rows_keeps_columns_in_step() {
        let table = DayTable::new(
            vec![label("090000"), label("100000"), label("150000")],
            vec![("alpha_1".into(), ColumnData::Numeric(vec![1.0, 2.0, 3.0]))],
        );
        let kept = table.retain_rows(|l| l.as_str() == "100000");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.numeric("alpha_1").unwrap(), &[2.0]);
    }

    #[test]
    fn take_rows_reorders_every_column() {
        let table = DayTable::new(
            vec![label("100000"), label("100100"), label("100200")],
            vec![
                ("alpha_1".into(), ColumnData::Numeric(vec![1.0, 2.0, 3.0])),
                ("note".into(), ColumnData::Text(vec!["a".into(), "b".into(), "c".into()])),
            ],
        );
        let taken = table.take_rows(&[2, 0, 1]);
        let labels: Vec<&str> = taken.index.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, ["100200", "100000", "100100"]);
        assert_eq!(taken.numeric("alpha_1").unwrap(), &[3.0, 1.0, 2.0]);
        assert_eq!(
            taken.columns[1].1,
            ColumnData::Text(vec!["c".into(), "a".into(), "b".into()])
        );
    }
}
