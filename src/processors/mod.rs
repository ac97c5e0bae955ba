pub mod ingest_report;
pub mod ingestor;
pub mod normalizer;
pub mod selector;
pub mod timestamp_index;

pub use ingest_report::{IngestReport, SkipReason, SkippedRow};
pub use ingestor::{Ingestor, InputFiles};
pub use normalizer::{percent_score, ScoreBounds};
pub use selector::{Criterion, SelectionMode};
pub use timestamp_index::TimestampIndex;
