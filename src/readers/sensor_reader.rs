use crate::error::{GapError, Result};
use crate::models::{ActualReading, ExtraData, RecordKind, Sensor};
use crate::processors::IngestReport;
use crate::readers::delimited::{parse_optional_value, DateParser, DelimitedInput};
use crate::readers::Ingested;
use crate::utils::coordinates::{coordinate_key, parse_point};
use geo::Point;
use std::collections::HashMap;
use std::io::Read;

/// Reads the sensor file (`lon, lat, name, extra...`) and the actual
/// reading file (`timestamp, lon, lat, value, extra...`).
pub struct SensorReader {
    dates: DateParser,
}

impl SensorReader {
    pub fn new() -> Self {
        Self {
            dates: DateParser::default(),
        }
    }

    pub fn with_date_formats(formats: Vec<String>) -> Self {
        Self {
            dates: DateParser::new(formats),
        }
    }

    /// Read sensors. A row whose location is already taken is skipped.
    pub fn read_sensors<R: Read>(&self, input: R) -> Result<Ingested<Sensor>> {
        let input = DelimitedInput::read(input, RecordKind::Sensors.fixed_columns())?;

        let parsed = input.parse_rows(|header, record| {
            let geom = parse_point(header.field(record, 0)?, header.field(record, 1)?)?;
            let name = header.field(record, 2)?.to_string();
            let extra_data = header.extra_data(record)?;
            Ok((geom, name, extra_data))
        });

        let mut report = IngestReport::new(RecordKind::Sensors);
        let mut sensors: Vec<Sensor> = Vec::with_capacity(parsed.len());
        let mut seen: HashMap<(u64, u64), u64> = HashMap::with_capacity(parsed.len());

        for (line, result) in parsed {
            let outcome = result.and_then(|(geom, name, extra_data): (Point<f64>, String, ExtraData)| {
                let key = coordinate_key(&geom);
                if seen.contains_key(&key) {
                    return Err(GapError::DuplicateGeometry {
                        x: geom.x(),
                        y: geom.y(),
                    });
                }
                let id = sensors.len() as u64 + 1;
                seen.insert(key, id);
                Ok(Sensor::new(id, geom, name, extra_data))
            });

            match outcome {
                Ok(sensor) => {
                    sensors.push(sensor);
                    report.record_ingested();
                }
                Err(e) => report.record_skip(line, &e),
            }
        }

        Ok(Ingested::new(sensors, report))
    }

    /// Read actual readings, attaching each to the sensor at exactly the
    /// same location. Rows without a matching sensor are skipped; an
    /// unreadable value is kept as null.
    pub fn read_actuals<R: Read>(&self, input: R, sensors: &[Sensor]) -> Result<Ingested<ActualReading>> {
        let input = DelimitedInput::read(input, RecordKind::Actuals.fixed_columns())?;
        let by_location: HashMap<(u64, u64), u64> = sensors
            .iter()
            .map(|s| (coordinate_key(&s.geom), s.id))
            .collect();

        let parsed = input.parse_rows(|header, record| {
            let timestamp = self.dates.parse(header.field(record, 0)?)?;
            let geom = parse_point(header.field(record, 1)?, header.field(record, 2)?)?;
            let value = parse_optional_value(header.field(record, 3)?);
            let extra_data = header.extra_data(record)?;

            let sensor = by_location
                .get(&coordinate_key(&geom))
                .copied()
                .ok_or(GapError::SensorNotFound {
                    x: geom.x(),
                    y: geom.y(),
                })?;

            Ok(ActualReading::new(timestamp, sensor, value, extra_data))
        });

        Ok(Ingested::collect(RecordKind::Actuals, parsed))
    }
}

impl Default for SensorReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::SkipReason;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const SENSORS: &str = "\
long,lat,name,Postcode3,Address
-4.2247,57.4778,Inverness,IV1,Castle St
-2.0943,57.1497,Aberdeen,AB1,Union St
-3.1883,55.9533,Edinburgh,EH1,
-3.1883,55.9533,Edinburgh again,EH1,
west,55.0,Nowhere,XX1,
-4.0,56.0,Short row,PH1
";

    #[test]
    fn test_read_sensors() -> Result<()> {
        let ingested = SensorReader::new().read_sensors(SENSORS.as_bytes())?;

        let names: Vec<&str> = ingested.records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Inverness", "Aberdeen", "Edinburgh"]);

        let ids: Vec<u64> = ingested.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let first = &ingested.records[0];
        assert_eq!(first.extra_data.get("Postcode3").map(String::as_str), Some("IV1"));
        assert_eq!(first.extra_data.get("Address").map(String::as_str), Some("Castle St"));
        assert_eq!(ingested.records[2].extra_data.get("Address").map(String::as_str), Some(""));

        let report = &ingested.report;
        assert_eq!(report.rows_read, 6);
        assert_eq!(report.ingested, 3);
        assert_eq!(report.skipped_for(SkipReason::DuplicateGeometry), 1);
        assert_eq!(report.skipped_for(SkipReason::Parse), 1);
        assert_eq!(report.skipped_for(SkipReason::MissingColumn), 1);
        Ok(())
    }

    #[test]
    fn test_read_actuals_matches_sensors_by_location() -> Result<()> {
        let reader = SensorReader::new();
        let sensors = reader.read_sensors(SENSORS.as_bytes())?.records;

        let actuals = "\
timestamp,long,lat,value,note
2017-01-01,-4.2247,57.4778,12.5,ok
2017-01-01,-2.0943,57.1497,,gap
2017-01-02,-4.2247,57.4778,abc,typo
2017-01-02,-9.9,50.0,4.0,orphan
not-a-date,-4.2247,57.4778,1.0,bad
";
        let ingested = reader.read_actuals(actuals.as_bytes(), &sensors)?;
        let report = &ingested.report;

        assert_eq!(report.rows_read, 5);
        assert_eq!(
            ingested.records.len(),
            report.rows_read
                - report.skipped_for(SkipReason::UnknownSensor)
                - report.skipped_for(SkipReason::Parse)
        );
        assert_eq!(ingested.records.len(), 3);

        let first = &ingested.records[0];
        assert_eq!(first.sensor, 1);
        assert_eq!(first.value, Some(12.5));
        assert_eq!(first.timestamp, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        assert_eq!(first.extra_data.get("note").map(String::as_str), Some("ok"));

        // Unparseable values are null, not skipped
        assert_eq!(ingested.records[1].value, None);
        assert_eq!(ingested.records[2].value, None);
        assert_eq!(ingested.records[2].sensor, 1);
        Ok(())
    }

    #[test]
    fn test_negative_zero_matches_zero() -> Result<()> {
        let reader = SensorReader::new();
        let sensors = reader
            .read_sensors("long,lat,name\n0.0,51.4779,Greenwich\n".as_bytes())?
            .records;
        let ingested = reader.read_actuals(
            "timestamp,long,lat,value\n2017-01-01,-0.0,51.4779,3\n".as_bytes(),
            &sensors,
        )?;
        assert_eq!(ingested.records.len(), 1);
        Ok(())
    }

    #[test]
    fn test_coordinates_must_match_exactly() -> Result<()> {
        let reader = SensorReader::new();
        let sensors = reader
            .read_sensors("long,lat,name\n-4.2247,57.4778,Inverness\n".as_bytes())?
            .records;
        let ingested = reader.read_actuals(
            "timestamp,long,lat,value\n2017-01-01,-4.22470001,57.4778,3\n".as_bytes(),
            &sensors,
        )?;
        assert!(ingested.records.is_empty());
        assert_eq!(ingested.report.skipped_for(SkipReason::UnknownSensor), 1);
        Ok(())
    }
}
