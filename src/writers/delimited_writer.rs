//! Re-export of the ingested collections in the column layout the readers
//! accept, so an export can be ingested again unchanged.

use crate::error::Result;
use crate::models::{ExtraData, Region, Sensor};
use crate::store::{RegionDataset, SensorDataset};
use crate::utils::constants::MULTIPOLYGON_TAG;
use crate::utils::polygon::format_multipolygon;
use csv::Writer;
use std::collections::BTreeSet;
use std::io::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DelimitedWriter {
    delimiter: u8,
}

impl DelimitedWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    fn writer<W: Write>(&self, output: W) -> Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(output)
    }

    pub fn write_sensors<W: Write>(&self, output: W, sensors: &[Sensor]) -> Result<()> {
        let keys = extra_keys(sensors.iter().map(|s| &s.extra_data));
        let mut writer = self.writer(output);

        writer.write_record(header(&["long", "lat", "name"], &keys))?;
        for sensor in sensors {
            let mut row = vec![
                sensor.longitude().to_string(),
                sensor.latitude().to_string(),
                sensor.name.clone(),
            ];
            row.extend(extra_values(&sensor.extra_data, &keys));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Readings whose sensor is gone cannot be located and are left out.
    pub fn write_actuals<W: Write>(&self, output: W, data: &SensorDataset) -> Result<()> {
        let keys = extra_keys(data.actuals().iter().map(|a| &a.extra_data));
        let mut writer = self.writer(output);

        writer.write_record(header(&["timestamp", "long", "lat", "value"], &keys))?;
        for reading in data.actuals() {
            let Some(sensor) = data.sensor(reading.sensor) else {
                continue;
            };
            let mut row = vec![
                reading.timestamp.format(DATE_FORMAT).to_string(),
                sensor.longitude().to_string(),
                sensor.latitude().to_string(),
                reading.value.map(|v| v.to_string()).unwrap_or_default(),
            ];
            row.extend(extra_values(&reading.extra_data, &keys));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_regions<W: Write>(&self, output: W, regions: &[Region]) -> Result<()> {
        let keys = extra_keys(regions.iter().map(|r| &r.extra_data));
        let mut writer = self.writer(output);

        writer.write_record(header(&["region_id", "geom"], &keys))?;
        for region in regions {
            let mut row = vec![
                region.region_id.clone(),
                format_multipolygon(MULTIPOLYGON_TAG, &region.geom),
            ];
            row.extend(extra_values(&region.extra_data, &keys));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_estimates<W: Write>(&self, output: W, data: &RegionDataset) -> Result<()> {
        let keys = extra_keys(data.estimates().iter().map(|e| &e.extra_data));
        let mut writer = self.writer(output);

        writer.write_record(header(&["timestamp", "region_id", "value"], &keys))?;
        for estimate in data.estimates() {
            let Some(region) = data.region(estimate.region) else {
                continue;
            };
            let mut row = vec![
                estimate.timestamp.format(DATE_FORMAT).to_string(),
                region.region_id.clone(),
                estimate.value.to_string(),
            ];
            row.extend(extra_values(&estimate.extra_data, &keys));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for DelimitedWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn extra_keys<'a, I>(maps: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ExtraData>,
{
    maps.into_iter()
        .flat_map(|m| m.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn header(fixed: &[&str], keys: &[String]) -> Vec<String> {
    fixed
        .iter()
        .map(|name| name.to_string())
        .chain(keys.iter().cloned())
        .collect()
}

fn extra_values<'a>(extra: &'a ExtraData, keys: &'a [String]) -> impl Iterator<Item = String> + 'a {
    keys.iter()
        .map(move |key| extra.get(key).cloned().unwrap_or_default())
}
