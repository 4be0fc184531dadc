/// Factor engine: level-5 order-book ticks in, per-day `alpha_<i>` files out.
///
/// Architecture:
/// ```text
///   <input>/<date dir>/**/*.csv
///        │
///        ▼
///   ┌──────────┐
///   │   tick    │  record → Tick, trading-session check
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ formulas  │  Tick + previous tick of the same stock → 20 factors
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  engine   │  cross-sectional mean per tradeTime
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  output   │  <out>/<MMDD>.csv, tradeTime,alpha_1..alpha_20
///   └──────────┘
/// ```
///
/// `driver` walks the date directories and ties the stages together.

pub mod driver;
pub mod engine;
pub mod formulas;
pub mod output;
pub mod tick;

use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::DateKeyError;

#[derive(Debug, Error)]
pub enum FactorError {
    #[error("input directory not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("date directory '{dir}' does not map to an MMDD key: {source}")]
    BadDateDir {
        dir: String,
        #[source]
        source: DateKeyError,
    },
    #[error("no date directories under {}", .0.display())]
    NoDates(PathBuf),
}
