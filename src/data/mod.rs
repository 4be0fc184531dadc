/// Data layer: core types, loading, and session filtering.
///
/// Architecture:
/// ```text
///   <dir>/<MMDD>.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DayTable, index normalized to TimeLabel
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep rows inside the SessionWindow
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ DayTable  │  Vec<TimeLabel> index, typed columns by name
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
