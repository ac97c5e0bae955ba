//! Region value estimation from point observations.
//!
//! Methods form a closed set registered in [`EstimationMethod::ALL`]. The
//! [`EstimatorFactory`] turns a method name into a [`RegionEstimator`]
//! bound to a borrowed [`EstimationContext`].

use crate::config::EstimationSettings;
use crate::error::{GapError, Result};
use crate::models::{ActualReading, ExtraData, Region, Sensor};
use chrono::NaiveDate;
use geo::Point;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub mod diffusion;
pub mod distance_simple;
pub mod inverse_distance;
pub mod nearest;

pub use diffusion::DiffusionEstimator;
pub use distance_simple::DistanceSimpleEstimator;
pub use inverse_distance::InverseDistanceEstimator;
pub use nearest::NearestNeighbourEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimationMethod {
    NearestNeighbour,
    InverseDistance,
    DistanceSimple,
    Diffusion,
}

impl EstimationMethod {
    pub const ALL: [EstimationMethod; 4] = [
        EstimationMethod::NearestNeighbour,
        EstimationMethod::InverseDistance,
        EstimationMethod::DistanceSimple,
        EstimationMethod::Diffusion,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == name.trim())
    }

    pub fn name(&self) -> &'static str {
        match self {
            EstimationMethod::NearestNeighbour => "nearest-neighbour",
            EstimationMethod::InverseDistance => "inverse-distance",
            EstimationMethod::DistanceSimple => "distance-simple",
            EstimationMethod::Diffusion => "diffusion",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EstimationMethod::NearestNeighbour => "Value of the observation closest to the region centroid",
            EstimationMethod::InverseDistance => "Inverse-distance weighted mean around the region centroid",
            EstimationMethod::DistanceSimple => "Mean of observations inside the region, else of the nearest ones",
            EstimationMethod::Diffusion => "Spread observed region means to neighbouring regions",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One computed region value. `value` is `None` when nothing could be
/// estimated for the region at that timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionEstimate {
    pub region_id: String,
    pub value: Option<f64>,
    pub extra_data: ExtraData,
}

impl RegionEstimate {
    pub fn new(region: &Region, value: Option<f64>) -> Self {
        Self {
            region_id: region.region_id.clone(),
            value,
            extra_data: region.extra_data.clone(),
        }
    }
}

/// An estimation strategy bound to one set of sensors and regions.
///
/// Implementations hold no mutable state: each call depends only on the
/// context and the timestamp.
pub trait RegionEstimator: Send + Sync + fmt::Debug {
    fn method(&self) -> EstimationMethod;

    /// One estimate per region, in region order.
    fn estimate_all(&self, timestamp: NaiveDate) -> Vec<RegionEstimate>;
}

/// A non-null reading together with where it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    pub sensor: &'a Sensor,
    pub value: f64,
}

impl Observation<'_> {
    pub fn location(&self) -> &Point<f64> {
        &self.sensor.geom
    }
}

/// Borrowed inputs of an estimation: the sensors that passed selection,
/// every region, and the actual readings to draw observations from.
#[derive(Debug, Clone)]
pub struct EstimationContext<'a> {
    sensors: HashMap<u64, &'a Sensor>,
    regions: &'a [Region],
    readings: &'a [ActualReading],
}

impl<'a> EstimationContext<'a> {
    pub fn new<I>(sensors: I, regions: &'a [Region], readings: &'a [ActualReading]) -> Self
    where
        I: IntoIterator<Item = &'a Sensor>,
    {
        Self {
            sensors: sensors.into_iter().map(|s| (s.id, s)).collect(),
            regions,
            readings,
        }
    }

    pub fn regions(&self) -> &'a [Region] {
        self.regions
    }

    /// Non-null readings at `timestamp` from selected sensors, in reading order.
    pub fn observations(&self, timestamp: NaiveDate) -> Vec<Observation<'a>> {
        self.readings
            .iter()
            .filter(|reading| reading.timestamp == timestamp)
            .filter_map(|reading| {
                let value = reading.value?;
                let sensor = *self.sensors.get(&reading.sensor)?;
                Some(Observation { sensor, value })
            })
            .collect()
    }

    /// Region centroids in region order.
    pub(crate) fn centroids(&self) -> Vec<Option<Point<f64>>> {
        self.regions.iter().map(Region::centroid).collect()
    }
}

/// Arithmetic mean, `None` for no values.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone)]
pub struct EstimatorFactory {
    settings: EstimationSettings,
}

impl EstimatorFactory {
    pub fn new(settings: EstimationSettings) -> Self {
        Self { settings }
    }

    /// Resolve `name` against the registered methods.
    pub fn create<'a>(&self, name: &str, context: EstimationContext<'a>) -> Result<Box<dyn RegionEstimator + 'a>> {
        let method = EstimationMethod::from_name(name)
            .ok_or_else(|| GapError::UnknownMethod(name.to_string()))?;
        Ok(self.build(method, context))
    }

    pub fn build<'a>(&self, method: EstimationMethod, context: EstimationContext<'a>) -> Box<dyn RegionEstimator + 'a> {
        match method {
            EstimationMethod::NearestNeighbour => Box::new(NearestNeighbourEstimator::new(context)),
            EstimationMethod::InverseDistance => {
                Box::new(InverseDistanceEstimator::new(context, self.settings.idw_power))
            }
            EstimationMethod::DistanceSimple => Box::new(DistanceSimpleEstimator::new(context)),
            EstimationMethod::Diffusion => {
                Box::new(DiffusionEstimator::new(context, self.settings.diffusion_max_rings))
            }
        }
    }
}

impl Default for EstimatorFactory {
    fn default() -> Self {
        Self::new(EstimationSettings::default())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, d).unwrap()
    }

    pub fn sensor(id: u64, x: f64, y: f64) -> Sensor {
        Sensor::new(id, Point::new(x, y), format!("S{}", id), ExtraData::new())
    }

    /// Axis-aligned square region with its lower-left corner at (x, y).
    pub fn square(id: u64, x: f64, y: f64, size: f64) -> Region {
        let ring = LineString::from(vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]);
        let mut extra = ExtraData::new();
        extra.insert("label".to_string(), format!("square {}", id));
        Region::new(
            id,
            format!("R{}", id),
            MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
            extra,
        )
    }

    pub fn reading(sensor: u64, d: u32, value: Option<f64>) -> ActualReading {
        ActualReading::new(day(d), sensor, value, ExtraData::new())
    }

    pub fn values(estimates: &[RegionEstimate]) -> Vec<Option<f64>> {
        estimates.iter().map(|e| e.value).collect()
    }

    pub fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_method_registry() {
        for method in EstimationMethod::ALL {
            assert_eq!(EstimationMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(EstimationMethod::from_name("file"), None);
        assert_eq!(EstimationMethod::from_name("nonexistent"), None);
    }

    #[test]
    fn test_factory_rejects_unknown_method() {
        let regions = vec![square(1, 0.0, 0.0, 1.0)];
        let context = EstimationContext::new(std::iter::empty(), &regions, &[]);
        let result = EstimatorFactory::default().create("nonexistent", context);
        assert!(matches!(result, Err(GapError::UnknownMethod(name)) if name == "nonexistent"));
    }

    #[test]
    fn test_observations_use_selected_non_null_readings() {
        let sensors = vec![sensor(1, 0.5, 0.5), sensor(2, 5.0, 5.0)];
        let readings = vec![
            reading(1, 1, Some(1.0)),
            reading(2, 1, Some(2.0)),
            reading(1, 2, None),
            reading(2, 2, Some(4.0)),
        ];
        let context = EstimationContext::new(sensors.iter().take(1), &[], &readings);

        let values: Vec<f64> = context.observations(day(1)).iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0]);
        assert!(context.observations(day(2)).is_empty());
        assert!(context.observations(day(3)).is_empty());
    }

    #[test]
    fn test_every_method_emits_every_region() {
        let regions = vec![square(1, 0.0, 0.0, 1.0), square(2, 3.0, 0.0, 1.0)];
        let sensors = vec![sensor(1, 0.5, 0.5)];
        let readings = vec![reading(1, 1, Some(7.0))];
        let factory = EstimatorFactory::default();

        for method in EstimationMethod::ALL {
            let context = EstimationContext::new(&sensors, &regions, &readings);
            let estimator = factory.build(method, context);
            assert_eq!(estimator.method(), method);

            let estimates = estimator.estimate_all(day(1));
            let ids: Vec<&str> = estimates.iter().map(|e| e.region_id.as_str()).collect();
            assert_eq!(ids, vec!["R1", "R2"], "{}", method);
            assert!(close(estimates[0].value, 7.0), "{}", method);
            assert_eq!(estimates[0].extra_data.get("label").map(String::as_str), Some("square 1"));

            // no observations at all
            let empty = estimator.estimate_all(day(9));
            assert_eq!(values(&empty), vec![None, None], "{}", method);
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean([1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(std::iter::empty()), None);
    }
}
