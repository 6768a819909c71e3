use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::types::{Grade, Level, Signal};

/// Terminal state of one instrument's analysis within a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentStatus {
    /// At least one signal passed the grade floor.
    Accepted,
    /// Levels or sweeps were found but nothing survived the filters.
    Dropped,
    /// Candle fetch failed or returned no data.
    Error,
}

/// Per-instrument outcome of one scan pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResult {
    pub instrument: String,
    pub status: InstrumentStatus,
    pub signals: Vec<Signal>,
    /// Levels extracted for this instrument (empty on fetch error).
    pub levels: Vec<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstrumentResult {
    pub fn error(instrument: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            status: InstrumentStatus::Error,
            signals: Vec::new(),
            levels: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Tally of accepted signals per grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCounts {
    pub a_plus: u32,
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl GradeCounts {
    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::APlus => self.a_plus += 1,
            Grade::A => self.a += 1,
            Grade::B => self.b += 1,
            Grade::C => self.c += 1,
            Grade::D => self.d += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.a_plus + self.a + self.b + self.c + self.d
    }
}

/// Immutable snapshot of one full scan pass.
///
/// Owned by the scanner; replaced wholesale on each run. Readers only ever
/// observe complete snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Unix timestamp (milliseconds) when the scan finished.
    pub timestamp: i64,
    pub timeframe: String,
    /// Accepted signals, sorted by score descending (ties broken by level
    /// priority ascending).
    pub signals: Vec<Signal>,
    pub signals_found: usize,
    pub grade_counts: GradeCounts,
    pub results: Vec<InstrumentResult>,
    pub applied_config: ScanConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_counts_record_and_total() {
        let mut counts = GradeCounts::default();
        counts.record(Grade::APlus);
        counts.record(Grade::A);
        counts.record(Grade::A);
        counts.record(Grade::D);
        assert_eq!(counts.a_plus, 1);
        assert_eq!(counts.a, 2);
        assert_eq!(counts.d, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_instrument_result_error_constructor() {
        let result = InstrumentResult::error("EUR_USD", "fetch failed");
        assert_eq!(result.status, InstrumentStatus::Error);
        assert!(result.signals.is_empty());
        assert_eq!(result.error.as_deref(), Some("fetch failed"));
    }
}
