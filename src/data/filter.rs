use super::model::{DayTable, LabelError, TimeLabel};

// ---------------------------------------------------------------------------
// Session window: inclusive time-of-day bounds
// ---------------------------------------------------------------------------

/// Default session open, inclusive.
pub const SESSION_START: &str = "093000";
/// Default session close, inclusive.
pub const SESSION_END: &str = "145700";

/// Inclusive `[start, end]` range of time labels a row must fall in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: TimeLabel,
    pub end: TimeLabel,
}

impl Default for SessionWindow {
    fn default() -> Self {
        SessionWindow {
            start: TimeLabel(SESSION_START.to_string()),
            end: TimeLabel(SESSION_END.to_string()),
        }
    }
}

impl SessionWindow {
    /// Build a window from raw bounds, normalizing both.
    pub fn parse(start: &str, end: &str) -> Result<Self, LabelError> {
        Ok(SessionWindow {
            start: TimeLabel::normalize(start)?,
            end: TimeLabel::normalize(end)?,
        })
    }

    pub fn contains(&self, label: &TimeLabel) -> bool {
        &self.start <= label && label <= &self.end
    }

    /// Rows of `table` inside the window, original order preserved.
    pub fn apply(&self, table: &DayTable) -> DayTable {
        table.retain_rows(|label| self.contains(label))
    }
}
