use crate::error::GapError;
use crate::models::RecordKind;
use crate::utils::constants::REPORT_SAMPLE_LIMIT;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Why an input row was left out of its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Parse,
    MissingColumn,
    UnknownSensor,
    UnknownRegion,
    DuplicateGeometry,
    DuplicateRegion,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::Parse => "unparseable",
            SkipReason::MissingColumn => "missing column",
            SkipReason::UnknownSensor => "no matching sensor",
            SkipReason::UnknownRegion => "no matching region",
            SkipReason::DuplicateGeometry => "duplicate sensor location",
            SkipReason::DuplicateRegion => "duplicate region id",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the input, header included
    pub line: u64,
    pub reason: SkipReason,
    pub details: String,
}

/// Outcome of one ingestion batch. Skipped rows never fail the batch;
/// they are counted here instead.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub kind: RecordKind,
    pub rows_read: usize,
    pub ingested: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub samples: Vec<SkippedRow>,
}

impl IngestReport {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            rows_read: 0,
            ingested: 0,
            skipped: BTreeMap::new(),
            samples: Vec::new(),
        }
    }

    pub fn record_ingested(&mut self) {
        self.rows_read += 1;
        self.ingested += 1;
    }

    pub fn record_skip(&mut self, line: u64, error: &GapError) {
        let reason = error.skip_reason();
        self.rows_read += 1;
        *self.skipped.entry(reason).or_default() += 1;

        debug!("Skipping {} row at line {}: {}", self.kind, line, error);

        if self.samples.len() < REPORT_SAMPLE_LIMIT {
            self.samples.push(SkippedRow {
                line,
                reason,
                details: error.to_string(),
            });
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    /// Emit the batch outcome to the log.
    pub fn log(&self) {
        if self.skipped_total() == 0 {
            info!("Ingested {} {} rows", self.ingested, self.kind);
        } else {
            warn!(
                "Ingested {} of {} {} rows ({} skipped: {})",
                self.ingested,
                self.rows_read,
                self.kind,
                self.skipped_total(),
                self.reason_breakdown()
            );
        }
    }

    fn reason_breakdown(&self) -> String {
        self.skipped
            .iter()
            .map(|(reason, count)| format!("{} {}", count, reason))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== {} ===\n", self.kind));
        summary.push_str(&format!("Rows Read: {}\n", self.rows_read));
        summary.push_str(&format!(
            "Ingested: {} ({:.1}%)\n",
            self.ingested,
            percentage(self.ingested, self.rows_read)
        ));
        summary.push_str(&format!("Skipped: {}\n", self.skipped_total()));

        for (reason, count) in &self.skipped {
            summary.push_str(&format!("  {}: {}\n", reason, count));
        }

        if !self.samples.is_empty() {
            summary.push_str(&format!("\nFirst {} skipped rows:\n", self.samples.len()));
            for sample in &self.samples {
                summary.push_str(&format!("  line {}: {}\n", sample.line, sample.details));
            }
        }

        summary
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_by_reason() {
        let mut report = IngestReport::new(RecordKind::Actuals);
        report.record_ingested();
        report.record_ingested();
        report.record_skip(4, &GapError::SensorNotFound { x: 1.0, y: 2.0 });
        report.record_skip(5, &GapError::Parse("bad date".to_string()));
        report.record_skip(6, &GapError::SensorNotFound { x: 3.0, y: 4.0 });

        assert_eq!(report.rows_read, 5);
        assert_eq!(report.ingested, 2);
        assert_eq!(report.skipped_total(), 3);
        assert_eq!(report.skipped_for(SkipReason::UnknownSensor), 2);
        assert_eq!(report.skipped_for(SkipReason::Parse), 1);
        assert_eq!(report.skipped_for(SkipReason::DuplicateRegion), 0);
        assert_eq!(report.samples[0].line, 4);
    }

    #[test]
    fn test_samples_are_capped() {
        let mut report = IngestReport::new(RecordKind::Regions);
        for line in 0..(REPORT_SAMPLE_LIMIT as u64 + 5) {
            report.record_skip(line, &GapError::Parse("x".to_string()));
        }
        assert_eq!(report.samples.len(), REPORT_SAMPLE_LIMIT);
        assert_eq!(report.skipped_total(), REPORT_SAMPLE_LIMIT + 5);
    }

    #[test]
    fn test_summary_mentions_reasons() {
        let mut report = IngestReport::new(RecordKind::Sensors);
        report.record_ingested();
        report.record_skip(3, &GapError::DuplicateGeometry { x: 0.0, y: 0.0 });

        let summary = report.summary();
        assert!(summary.contains("=== sensors ==="));
        assert!(summary.contains("Ingested: 1 (50.0%)"));
        assert!(summary.contains("duplicate sensor location: 1"));
    }
}
