use crate::error::Result;
use crate::models::{ExtraData, Region, Sensor};
use crate::store::{RegionDataset, SensorDataset};
use crate::utils::constants::MULTIPOLYGON_TAG;
use crate::utils::polygon::format_multipolygon;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn write<W: Write, T: Serialize + ?Sized>(&self, mut output: W, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut output, value)?;
        } else {
            serde_json::to_writer(&mut output, value)?;
        }
        writeln!(output)?;
        output.flush()?;
        Ok(())
    }

    pub fn write_file<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file), value)
    }

    pub fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    pub fn write_sensors<W: Write>(&self, output: W, sensors: &[Sensor]) -> Result<()> {
        let rows: Vec<SensorJson<'_>> = sensors.iter().map(SensorJson::from).collect();
        self.write(output, &rows)
    }

    pub fn write_actuals<W: Write>(&self, output: W, data: &SensorDataset) -> Result<()> {
        let rows: Vec<ActualJson<'_>> = data
            .actuals()
            .iter()
            .map(|reading| ActualJson {
                timestamp: reading.timestamp,
                sensor_id: reading.sensor,
                name: data.sensor(reading.sensor).map(|s| s.name.as_str()),
                value: reading.value,
                extra_data: &reading.extra_data,
            })
            .collect();
        self.write(output, &rows)
    }

    pub fn write_regions<W: Write>(&self, output: W, regions: &[Region]) -> Result<()> {
        let rows: Vec<RegionJson<'_>> = regions.iter().map(RegionJson::from).collect();
        self.write(output, &rows)
    }

    pub fn write_estimates<W: Write>(&self, output: W, data: &RegionDataset) -> Result<()> {
        let rows: Vec<EstimateJson<'_>> = data
            .estimates()
            .iter()
            .filter_map(|estimate| {
                let region = data.region(estimate.region)?;
                Some(EstimateJson {
                    timestamp: estimate.timestamp,
                    region_id: &region.region_id,
                    value: estimate.value,
                    extra_data: &estimate.extra_data,
                })
            })
            .collect();
        self.write(output, &rows)
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SensorJson<'a> {
    id: u64,
    name: &'a str,
    longitude: f64,
    latitude: f64,
    extra_data: &'a ExtraData,
}

impl<'a> From<&'a Sensor> for SensorJson<'a> {
    fn from(sensor: &'a Sensor) -> Self {
        Self {
            id: sensor.id,
            name: &sensor.name,
            longitude: sensor.longitude(),
            latitude: sensor.latitude(),
            extra_data: &sensor.extra_data,
        }
    }
}

#[derive(Serialize)]
struct ActualJson<'a> {
    timestamp: NaiveDate,
    sensor_id: u64,
    name: Option<&'a str>,
    value: Option<f64>,
    extra_data: &'a ExtraData,
}

#[derive(Serialize)]
struct RegionJson<'a> {
    id: u64,
    region_id: &'a str,
    geom: String,
    extra_data: &'a ExtraData,
}

impl<'a> From<&'a Region> for RegionJson<'a> {
    fn from(region: &'a Region) -> Self {
        Self {
            id: region.id,
            region_id: &region.region_id,
            geom: format_multipolygon(MULTIPOLYGON_TAG, &region.geom),
            extra_data: &region.extra_data,
        }
    }
}

#[derive(Serialize)]
struct EstimateJson<'a> {
    timestamp: NaiveDate,
    region_id: &'a str,
    value: f64,
    extra_data: &'a ExtraData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::SensorReader;
    use serde_json::{json, Value};

    #[test]
    fn test_sensor_rows() {
        let sensors = SensorReader::new()
            .read_sensors("long,lat,name,pc\n-4.25,57.5,Inverness,IV1\n".as_bytes())
            .unwrap()
            .records;

        let mut buffer = Vec::new();
        JsonWriter::compact().write_sensors(&mut buffer, &sensors).unwrap();
        let value: Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(
            value,
            json!([{
                "id": 1,
                "name": "Inverness",
                "longitude": -4.25,
                "latitude": 57.5,
                "extra_data": {"pc": "IV1"}
            }])
        );
    }

    #[test]
    fn test_pretty_and_compact() {
        let rows = vec![json!({"a": 1})];
        assert_eq!(JsonWriter::compact().to_string(&rows).unwrap(), "[{\"a\":1}]");
        assert!(JsonWriter::new().to_string(&rows).unwrap().contains('\n'));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        JsonWriter::new().write_file(&path, &vec![1, 2, 3]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<i32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
