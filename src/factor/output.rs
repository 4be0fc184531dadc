use std::path::Path;

use super::engine::FactorRow;
use super::formulas::FACTOR_COUNT;
use super::FactorError;

pub const TIME_HEADER: &str = "tradeTime";

/// `tradeTime,alpha_1,...,alpha_20`.
pub fn header() -> Vec<String> {
    std::iter::once(TIME_HEADER.to_string())
        .chain((1..=FACTOR_COUNT).map(|i| format!("alpha_{i}")))
        .collect()
}

/// Write one day's rows. The trade time is written as the plain integer and
/// each factor with six decimals.
pub fn write_day(path: &Path, rows: &[FactorRow]) -> Result<(), FactorError> {
    let csv_err = |source: csv::Error| FactorError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(header()).map_err(csv_err)?;
    for row in rows {
        let mut record = Vec::with_capacity(FACTOR_COUNT + 1);
        record.push(row.trade_time.to_string());
        record.extend(row.values.iter().map(|v| format!("{v:.6}")));
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| FactorError::Io {
        path: path.to_path_buf(),
        source,
    })
}
