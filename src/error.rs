use crate::processors::SkipReason;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GapError>;

#[derive(Error, Debug)]
pub enum GapError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing column {index} ({name})")]
    MissingColumn { index: usize, name: String },

    #[error("No sensor at ({x}, {y})")]
    SensorNotFound { x: f64, y: f64 },

    #[error("Region '{region_id}' not found")]
    RegionNotFound { region_id: String },

    #[error("A sensor already exists at ({x}, {y})")]
    DuplicateGeometry { x: f64, y: f64 },

    #[error("Region '{0}' is defined more than once")]
    DuplicateRegion(String),

    #[error("Unknown estimation method: '{0}'")]
    UnknownMethod(String),

    #[error("Timestamp index {index} out of range (have {len})")]
    Index { index: usize, len: usize },

    #[error("Unknown text encoding: '{0}'")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl GapError {
    /// Classify a row-level failure for the ingest report.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            GapError::MissingColumn { .. } => SkipReason::MissingColumn,
            GapError::SensorNotFound { .. } => SkipReason::UnknownSensor,
            GapError::RegionNotFound { .. } => SkipReason::UnknownRegion,
            GapError::DuplicateGeometry { .. } => SkipReason::DuplicateGeometry,
            GapError::DuplicateRegion(_) => SkipReason::DuplicateRegion,
            _ => SkipReason::Parse,
        }
    }
}
