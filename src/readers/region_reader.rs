use crate::error::{GapError, Result};
use crate::models::{EstimatedReading, RecordKind, Region};
use crate::processors::IngestReport;
use crate::readers::delimited::{parse_value, DateParser, DelimitedInput};
use crate::readers::Ingested;
use crate::utils::polygon::parse_multipolygon;
use std::collections::HashMap;
use std::io::Read;

/// Reads the region file (`region_id, geometry, extra...`) and the
/// estimated reading file (`timestamp, region_id, value, extra...`).
pub struct RegionReader {
    dates: DateParser,
}

impl RegionReader {
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

    /// Read regions. Geometry parsing is the expensive part and runs in
    /// parallel; a repeated `region_id` skips the later row.
    pub fn read_regions<R: Read>(&self, input: R) -> Result<Ingested<Region>> {
        let input = DelimitedInput::read(input, RecordKind::Regions.fixed_columns())?;

        let parsed = input.parse_rows(|header, record| {
            let region_id = header.field(record, 0)?.to_string();
            let geom = parse_multipolygon(header.field(record, 1)?)?;
            let extra_data = header.extra_data(record)?;
            Ok((region_id, geom, extra_data))
        });

        let mut report = IngestReport::new(RecordKind::Regions);
        let mut regions: Vec<Region> = Vec::with_capacity(parsed.len());
        let mut seen: HashMap<String, u64> = HashMap::with_capacity(parsed.len());

        for (line, result) in parsed {
            let outcome = result.and_then(|(region_id, geom, extra_data)| {
                if seen.contains_key(&region_id) {
                    return Err(GapError::DuplicateRegion(region_id));
                }
                let id = regions.len() as u64 + 1;
                seen.insert(region_id.clone(), id);
                Ok(Region::new(id, region_id, geom, extra_data))
            });

            match outcome {
                Ok(region) => {
                    regions.push(region);
                    report.record_ingested();
                }
                Err(e) => report.record_skip(line, &e),
            }
        }

        Ok(Ingested::new(regions, report))
    }

    /// Read estimated readings, resolving each region by its `region_id`.
    pub fn read_estimates<R: Read>(&self, input: R, regions: &[Region]) -> Result<Ingested<EstimatedReading>> {
        let input = DelimitedInput::read(input, RecordKind::Estimates.fixed_columns())?;
        let by_region_id: HashMap<&str, u64> = regions
            .iter()
            .map(|r| (r.region_id.as_str(), r.id))
            .collect();

        let parsed = input.parse_rows(|header, record| {
            let timestamp = self.dates.parse(header.field(record, 0)?)?;
            let region_id = header.field(record, 1)?;
            let region = by_region_id
                .get(region_id)
                .copied()
                .ok_or_else(|| GapError::RegionNotFound {
                    region_id: region_id.to_string(),
                })?;
            let value = parse_value(header.field(record, 2)?)?;
            let extra_data = header.extra_data(record)?;

            Ok(EstimatedReading::new(timestamp, region, value, extra_data))
        });

        Ok(Ingested::collect(RecordKind::Estimates, parsed))
    }
}

impl Default for RegionReader {
    fn default() -> Self {
        Self::new()
    }
}
