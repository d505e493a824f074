//! Run summary model

use std::time::Duration;

/// Outcome counters for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data rows read from the file (header excluded)
    pub rows: u64,
    /// Records fully imported
    pub imported: u64,
    /// Rows skipped because they could not be read or parsed
    pub skipped: u64,
    /// Records whose inserts failed
    pub failed: u64,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl ImportSummary {
    /// Get duration as formatted string
    pub fn duration_str(&self) -> String {
        let ms = self.elapsed.as_millis();
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", self.elapsed.as_secs_f64())
        }
    }

    /// True when every data row made it into the project
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}
