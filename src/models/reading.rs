use chrono::NaiveDate;

use super::ExtraData;

/// A measurement taken by one sensor. `value` is `None` when the source
/// text was empty or not numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualReading {
    pub timestamp: NaiveDate,
    /// Identity of the owning sensor.
    pub sensor: u64,
    pub value: Option<f64>,
    pub extra_data: ExtraData,
}

/// A precomputed value for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedReading {
    pub timestamp: NaiveDate,
    /// Identity of the owning region.
    pub region: u64,
    pub value: f64,
    pub extra_data: ExtraData,
}

impl ActualReading {
    pub fn new(timestamp: NaiveDate, sensor: u64, value: Option<f64>, extra_data: ExtraData) -> Self {
        Self {
            timestamp,
            sensor,
            value,
            extra_data,
        }
    }
}

impl EstimatedReading {
    pub fn new(timestamp: NaiveDate, region: u64, value: f64, extra_data: ExtraData) -> Self {
        Self {
            timestamp,
            region,
            value,
            extra_data,
        }
    }
}
