pub mod delimited_writer;
pub mod geojson_writer;
pub mod json_writer;

pub use delimited_writer::DelimitedWriter;
pub use json_writer::JsonWriter;

use crate::error::{GapError, Result};
use crate::models::RecordKind;
use crate::store::DataStore;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    GeoJson,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "geojson" => Some(ExportFormat::GeoJson),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::GeoJson => "geojson",
        }
    }
}

/// Write one collection of the current store contents.
pub fn export<W: Write>(store: &DataStore, kind: RecordKind, format: ExportFormat, output: W) -> Result<()> {
    let sensors = store.sensor_snapshot();
    let regions = store.region_snapshot();

    match (format, kind) {
        (ExportFormat::Csv, RecordKind::Sensors) => DelimitedWriter::new().write_sensors(output, sensors.sensors()),
        (ExportFormat::Csv, RecordKind::Actuals) => DelimitedWriter::new().write_actuals(output, &sensors),
        (ExportFormat::Csv, RecordKind::Regions) => DelimitedWriter::new().write_regions(output, regions.regions()),
        (ExportFormat::Csv, RecordKind::Estimates) => DelimitedWriter::new().write_estimates(output, &regions),
        (ExportFormat::Json, RecordKind::Sensors) => JsonWriter::new().write_sensors(output, sensors.sensors()),
        (ExportFormat::Json, RecordKind::Actuals) => JsonWriter::new().write_actuals(output, &sensors),
        (ExportFormat::Json, RecordKind::Regions) => JsonWriter::new().write_regions(output, regions.regions()),
        (ExportFormat::Json, RecordKind::Estimates) => JsonWriter::new().write_estimates(output, &regions),
        (ExportFormat::GeoJson, RecordKind::Sensors) => {
            geojson_writer::write_collection(output, &geojson_writer::sensors_collection(sensors.sensors()))
        }
        (ExportFormat::GeoJson, RecordKind::Regions) => {
            geojson_writer::write_collection(output, &geojson_writer::regions_collection(regions.regions()))
        }
        (ExportFormat::GeoJson, kind) => Err(GapError::InvalidFormat(format!(
            "{} have no geometry of their own; export them as csv or json",
            kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::from_name("GeoJSON"), Some(ExportFormat::GeoJson));
        assert_eq!(ExportFormat::from_name("csv").map(|f| f.extension()), Some("csv"));
        assert_eq!(ExportFormat::from_name("parquet"), None);
    }

    #[test]
    fn test_geojson_needs_geometry() {
        let store = DataStore::new();
        let result = export(&store, RecordKind::Actuals, ExportFormat::GeoJson, Vec::new());
        assert!(matches!(result, Err(GapError::InvalidFormat(_))));

        let mut buffer = Vec::new();
        export(&store, RecordKind::Regions, ExportFormat::GeoJson, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["features"].as_array().map(Vec::len), Some(0));
    }
}
