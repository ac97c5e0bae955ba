use crate::error::{GapError, Result};
use crate::models::ActualReading;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Ascending, duplicate-free reading dates. Queries address a timestamp by
/// its position here, so the index is rebuilt only when actual readings
/// are replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampIndex {
    timestamps: Vec<NaiveDate>,
}

impl TimestampIndex {
    pub fn build(readings: &[ActualReading]) -> Self {
        let unique: BTreeSet<NaiveDate> = readings.iter().map(|r| r.timestamp).collect();
        Self {
            timestamps: unique.into_iter().collect(),
        }
    }

    pub fn resolve(&self, index: usize) -> Result<NaiveDate> {
        self.timestamps.get(index).copied().ok_or(GapError::Index {
            index,
            len: self.timestamps.len(),
        })
    }

    pub fn position(&self, timestamp: NaiveDate) -> Option<usize> {
        self.timestamps.binary_search(&timestamp).ok()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.timestamps.iter()
    }
}
