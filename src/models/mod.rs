pub mod reading;
pub mod region;
pub mod sensor;

use std::collections::BTreeMap;

/// Per-record attributes named by the trailing header columns of a file.
pub type ExtraData = BTreeMap<String, String>;

pub use reading::{ActualReading, EstimatedReading};
pub use region::Region;
pub use sensor::{Sensor, NAME_ATTRIBUTE};

/// The four record collections the system ingests and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sensors,
    Actuals,
    Regions,
    Estimates,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Sensors,
        RecordKind::Actuals,
        RecordKind::Regions,
        RecordKind::Estimates,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sensors" | "sensor" => Some(RecordKind::Sensors),
            "actuals" | "actual" | "sensor_data" => Some(RecordKind::Actuals),
            "regions" | "region" => Some(RecordKind::Regions),
            "estimates" | "estimate" | "region_estimates" => Some(RecordKind::Estimates),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Sensors => "sensors",
            RecordKind::Actuals => "actuals",
            RecordKind::Regions => "regions",
            RecordKind::Estimates => "estimates",
        }
    }

    /// Number of leading columns before the extra-data columns.
    pub fn fixed_columns(&self) -> usize {
        use crate::utils::constants::*;
        match self {
            RecordKind::Sensors => SENSOR_FIXED_COLUMNS,
            RecordKind::Actuals => ACTUAL_FIXED_COLUMNS,
            RecordKind::Regions => REGION_FIXED_COLUMNS,
            RecordKind::Estimates => ESTIMATE_FIXED_COLUMNS,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_names() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(RecordKind::from_name(" Region_Estimates "), Some(RecordKind::Estimates));
        assert_eq!(RecordKind::from_name("stations"), None);
        assert_eq!(RecordKind::Actuals.fixed_columns(), 4);
    }
}
