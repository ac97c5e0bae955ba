pub mod delimited;
pub mod region_reader;
pub mod sensor_reader;
pub mod source;

pub use delimited::{DateParser, DelimitedInput, Header};
pub use region_reader::RegionReader;
pub use sensor_reader::SensorReader;
pub use source::SourceReader;

use crate::error::Result;
use crate::models::RecordKind;
use crate::processors::IngestReport;

/// A freshly read collection together with what was skipped on the way.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub report: IngestReport,
}

impl<T> Ingested<T> {
    pub fn new(records: Vec<T>, report: IngestReport) -> Self {
        Self { records, report }
    }

    /// Keep the parsed rows, counting the failed ones.
    pub fn collect(kind: RecordKind, parsed: Vec<(u64, Result<T>)>) -> Self {
        let mut report = IngestReport::new(kind);
        let mut records = Vec::with_capacity(parsed.len());

        for (line, result) in parsed {
            match result {
                Ok(record) => {
                    records.push(record);
                    report.record_ingested();
                }
                Err(e) => report.record_skip(line, &e),
            }
        }

        Self::new(records, report)
    }
}
