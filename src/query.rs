//! Read-side operations over the published datasets.
//!
//! Every query works on one snapshot per side, so a concurrent ingest is
//! either fully visible or not at all. Lookup failures (timestamp index
//! out of range, unknown method) produce an empty result and a warning.

use crate::config::Settings;
use crate::error::Result;
use crate::estimators::{EstimationContext, EstimationMethod, EstimatorFactory};
use crate::models::{ExtraData, NAME_ATTRIBUTE};
use crate::processors::normalizer::{compute_bounds, percent_score, ScoreBounds};
use crate::processors::selector::{self, Criterion};
use crate::store::{DataStore, SensorDataset};
use crate::utils::constants::{FILE_METHOD, FILE_METHOD_DESCRIPTION};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// One actual reading joined with its sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualRow {
    pub timestamp: NaiveDate,
    pub value: Option<f64>,
    pub sensor_id: u64,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Sensor attributes
    pub extra_data: ExtraData,
    /// Reading attributes
    pub reading_data: ExtraData,
    /// True when the sensor fails the request's selector criteria
    pub ignore: bool,
    pub percent_score: Option<f64>,
}

/// One region value, persisted or computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateRow {
    pub region_id: String,
    pub timestamp: NaiveDate,
    pub value: Option<f64>,
    pub extra_data: ExtraData,
    pub percent_score: Option<f64>,
}

/// A selectable method name with a one-line description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub struct QueryEngine {
    store: Arc<DataStore>,
    factory: EstimatorFactory,
    default_center: [f64; 2],
}

impl QueryEngine {
    pub fn new(store: Arc<DataStore>, settings: &Settings) -> Self {
        Self {
            store,
            factory: EstimatorFactory::new(settings.estimation.clone()),
            default_center: settings.default_center,
        }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Actual readings at the `index`-th timestamp, flagged against `criteria`.
    pub fn actuals_at(&self, index: usize, criteria: &[Criterion]) -> Vec<ActualRow> {
        self.try_actuals_at(index, criteria).unwrap_or_else(|e| {
            warn!("No actual data for timestamp #{}: {}", index, e);
            Vec::new()
        })
    }

    pub fn try_actuals_at(&self, index: usize, criteria: &[Criterion]) -> Result<Vec<ActualRow>> {
        let data = self.store.sensor_snapshot();
        let timestamp = data.timestamps().resolve(index)?;
        let bounds = score_bounds(&data);

        let rows = data
            .actuals_at(timestamp)
            .filter_map(|reading| {
                let sensor = data.sensor(reading.sensor)?;
                Some(ActualRow {
                    timestamp,
                    value: reading.value,
                    sensor_id: sensor.id,
                    name: sensor.name.clone(),
                    longitude: sensor.longitude(),
                    latitude: sensor.latitude(),
                    extra_data: sensor.extra_data.clone(),
                    reading_data: reading.extra_data.clone(),
                    ignore: !selector::select(sensor, criteria),
                    percent_score: percent_score(bounds.as_ref(), reading.value),
                })
            })
            .collect();

        Ok(rows)
    }

    /// Region values at the `index`-th timestamp: persisted estimates for
    /// `"file"`, otherwise computed by the named method from the sensors
    /// that `criteria` retain.
    pub fn estimates_at(&self, method: &str, index: usize, criteria: &[Criterion]) -> Vec<EstimateRow> {
        self.try_estimates_at(method, index, criteria)
            .unwrap_or_else(|e| {
                warn!("No '{}' estimates for timestamp #{}: {}", method, index, e);
                Vec::new()
            })
    }

    pub fn try_estimates_at(&self, method: &str, index: usize, criteria: &[Criterion]) -> Result<Vec<EstimateRow>> {
        let method = method.trim();
        let sensors = self.store.sensor_snapshot();
        let regions = self.store.region_snapshot();
        let timestamp = sensors.timestamps().resolve(index)?;
        let bounds = score_bounds(&sensors);

        if method == FILE_METHOD {
            let rows = regions
                .estimates_at(timestamp)
                .filter_map(|estimate| {
                    let region = regions.region(estimate.region)?;
                    Some(EstimateRow {
                        region_id: region.region_id.clone(),
                        timestamp,
                        value: Some(estimate.value),
                        extra_data: estimate.extra_data.clone(),
                        percent_score: percent_score(bounds.as_ref(), Some(estimate.value)),
                    })
                })
                .collect();
            return Ok(rows);
        }

        let selected = selector::filter(sensors.sensors(), criteria);
        debug!(
            "Estimating with '{}' from {} of {} sensors",
            method,
            selected.len(),
            sensors.sensors().len()
        );

        let context = EstimationContext::new(selected, regions.regions(), sensors.actuals());
        let estimator = self.factory.create(method, context)?;

        let rows = estimator
            .estimate_all(timestamp)
            .into_iter()
            .map(|estimate| EstimateRow {
                region_id: estimate.region_id,
                timestamp,
                value: estimate.value,
                extra_data: estimate.extra_data,
                percent_score: percent_score(bounds.as_ref(), estimate.value),
            })
            .collect();

        Ok(rows)
    }

    /// Selectable sensor attributes: `name`, then the first sensor's extra keys.
    pub fn sensor_fields(&self) -> Vec<String> {
        let data = self.store.sensor_snapshot();
        match data.sensors().first() {
            Some(sensor) => std::iter::once(NAME_ATTRIBUTE.to_string())
                .chain(sensor.extra_data.keys().cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Mean sensor position as (lat, lon), or the configured default.
    pub fn center(&self) -> [f64; 2] {
        let data = self.store.sensor_snapshot();
        if data.sensors().is_empty() {
            return self.default_center;
        }

        let (mut lon, mut lat) = (0.0, 0.0);
        for (i, sensor) in data.sensors().iter().enumerate() {
            let n = (i + 1) as f64;
            lon += (sensor.longitude() - lon) / n;
            lat += (sensor.latitude() - lat) / n;
        }
        [lat, lon]
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.store.sensor_snapshot().timestamps().as_slice().to_vec()
    }

    /// `"file"` followed by every registered estimation method.
    pub fn methods(&self) -> Vec<&'static str> {
        std::iter::once(FILE_METHOD)
            .chain(EstimationMethod::ALL.iter().map(|m| m.name()))
            .collect()
    }

    /// [`methods`](Self::methods) with descriptions, for listing.
    pub fn method_descriptions(&self) -> Vec<MethodInfo> {
        std::iter::once(MethodInfo {
            name: FILE_METHOD,
            description: FILE_METHOD_DESCRIPTION,
        })
        .chain(EstimationMethod::ALL.iter().map(|m| MethodInfo {
            name: m.name(),
            description: m.description(),
        }))
        .collect()
    }
}

fn score_bounds(data: &SensorDataset) -> Option<ScoreBounds> {
    compute_bounds(data.actuals().iter().map(|reading| reading.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::Ingestor;
    use pretty_assertions::assert_eq;

    const SENSORS: &str = "\
long,lat,name,pc
0.5,0.5,Alpha,IV1
5.5,0.5,Beta,IV2
";
    const ACTUALS: &str = "\
timestamp,long,lat,value,source
2017-01-02,0.5,0.5,10,manual
2017-01-02,5.5,0.5,30,auto
2017-01-01,0.5,0.5,20,manual
2017-01-01,5.5,0.5,,auto
";
    const REGIONS: &str = "\
region_id,geom,county
R1,\"MULTIPOLYGON 0,0 1,0 1,1 0,1 0,0\",North
R2,\"MULTIPOLYGON 5,0 6,0 6,1 5,1 5,0\",South
";
    const ESTIMATES: &str = "\
timestamp,region_id,value,model
2017-01-01,R2,25,v1
2017-01-02,R1,12,v1
";

    fn engine() -> QueryEngine {
        let store = Arc::new(DataStore::new());
        let ingestor = Ingestor::new(Arc::clone(&store), 2).unwrap();
        ingestor
            .ingest_sensor_pair(SENSORS.as_bytes(), Some(ACTUALS.as_bytes()))
            .unwrap();
        ingestor
            .ingest_region_pair(REGIONS.as_bytes(), Some(ESTIMATES.as_bytes()))
            .unwrap();
        QueryEngine::new(store, &Settings::default())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, d).unwrap()
    }

    #[test]
    fn test_timestamps_and_methods() {
        let engine = engine();
        assert_eq!(engine.timestamps(), vec![day(1), day(2)]);
        assert_eq!(
            engine.methods(),
            vec!["file", "nearest-neighbour", "inverse-distance", "distance-simple", "diffusion"]
        );
    }

    #[test]
    fn test_actuals_carry_scores_and_ignore_flags() {
        let engine = engine();
        let criteria = [Criterion::omit("name", ["Beta"])];
        let rows = engine.actuals_at(0, &criteria);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Alpha");
        assert_eq!(rows[0].value, Some(20.0));
        assert_eq!(rows[0].percent_score, Some(0.5));
        assert!(!rows[0].ignore);
        assert_eq!(rows[0].reading_data.get("source").map(String::as_str), Some("manual"));

        assert_eq!(rows[1].name, "Beta");
        assert_eq!(rows[1].value, None);
        assert_eq!(rows[1].percent_score, None);
        assert!(rows[1].ignore);
    }

    #[test]
    fn test_out_of_range_index_is_empty() {
        let engine = engine();
        assert!(engine.actuals_at(2, &[]).is_empty());
        assert!(engine.estimates_at("file", 99, &[]).is_empty());
        assert!(engine.try_actuals_at(2, &[]).is_err());
    }

    #[test]
    fn test_file_estimates_are_persisted_rows() {
        let engine = engine();
        let rows = engine.estimates_at("file", 0, &[]);
        assert_eq!(
            rows,
            vec![EstimateRow {
                region_id: "R2".to_string(),
                timestamp: day(1),
                value: Some(25.0),
                extra_data: [("model".to_string(), "v1".to_string())].into_iter().collect(),
                percent_score: Some(0.75),
            }]
        );
    }

    #[test]
    fn test_computed_estimates_respect_selection() {
        let engine = engine();

        let rows = engine.estimates_at("nearest-neighbour", 1, &[]);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(10.0), Some(30.0)]);
        assert_eq!(rows[0].extra_data.get("county").map(String::as_str), Some("North"));

        let only_alpha = [Criterion::select("pc", ["IV1"])];
        let rows = engine.estimates_at("nearest-neighbour", 1, &only_alpha);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(10.0), Some(10.0)]);
        // bounds still come from every actual reading
        assert_eq!(rows[1].percent_score, Some(0.0));
    }

    #[test]
    fn test_method_names_are_trimmed() {
        let engine = engine();
        assert_eq!(engine.estimates_at(" file ", 0, &[]).len(), 1);
        assert_eq!(engine.estimates_at("nearest-neighbour ", 1, &[]).len(), 2);
    }

    #[test]
    fn test_method_descriptions_follow_method_order() {
        let engine = engine();
        let listed = engine.method_descriptions();
        let names: Vec<&str> = listed.iter().map(|m| m.name).collect();
        assert_eq!(names, engine.methods());
        assert!(listed.iter().all(|m| !m.description.is_empty()));
    }

    #[test]
    fn test_unknown_method_is_empty() {
        let engine = engine();
        assert!(engine.estimates_at("nonexistent", 0, &[]).is_empty());
    }

    #[test]
    fn test_fields_and_center() {
        let engine = engine();
        assert_eq!(engine.sensor_fields(), vec!["name".to_string(), "pc".to_string()]);
        assert_eq!(engine.center(), [0.5, 3.0]);

        let empty = QueryEngine::new(Arc::new(DataStore::new()), &Settings::default());
        assert!(empty.sensor_fields().is_empty());
        assert_eq!(empty.center(), [54.2361, -4.5481]);
    }
}
