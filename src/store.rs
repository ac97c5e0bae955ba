//! Published datasets.
//!
//! Each side (sensors with their readings, regions with their estimates)
//! is an immutable dataset behind an `Arc`. Ingestion builds a complete
//! replacement off to the side and swaps the pointer, so a reader holds
//! either the old dataset or the new one, never a half-filled one.

use crate::error::Result;
use crate::models::{ActualReading, EstimatedReading, Region, Sensor};
use crate::processors::TimestampIndex;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::info;

#[derive(Debug, Default)]
pub struct SensorDataset {
    sensors: Vec<Sensor>,
    actuals: Vec<ActualReading>,
    timestamps: TimestampIndex,
    positions: HashMap<u64, usize>,
}

impl SensorDataset {
    pub fn new(sensors: Vec<Sensor>, actuals: Vec<ActualReading>) -> Self {
        let timestamps = TimestampIndex::build(&actuals);
        let positions = sensors.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        Self {
            sensors,
            actuals,
            timestamps,
            positions,
        }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn actuals(&self) -> &[ActualReading] {
        &self.actuals
    }

    pub fn timestamps(&self) -> &TimestampIndex {
        &self.timestamps
    }

    pub fn sensor(&self, id: u64) -> Option<&Sensor> {
        self.positions.get(&id).map(|&i| &self.sensors[i])
    }

    pub fn actuals_at(&self, timestamp: NaiveDate) -> impl Iterator<Item = &ActualReading> {
        self.actuals.iter().filter(move |r| r.timestamp == timestamp)
    }
}

#[derive(Debug, Default)]
pub struct RegionDataset {
    regions: Vec<Region>,
    estimates: Vec<EstimatedReading>,
    positions: HashMap<u64, usize>,
}

impl RegionDataset {
    pub fn new(regions: Vec<Region>, estimates: Vec<EstimatedReading>) -> Self {
        let positions = regions.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self {
            regions,
            estimates,
            positions,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn estimates(&self) -> &[EstimatedReading] {
        &self.estimates
    }

    pub fn region(&self, id: u64) -> Option<&Region> {
        self.positions.get(&id).map(|&i| &self.regions[i])
    }

    pub fn estimates_at(&self, timestamp: NaiveDate) -> impl Iterator<Item = &EstimatedReading> {
        self.estimates.iter().filter(move |r| r.timestamp == timestamp)
    }
}

#[derive(Debug, Default)]
pub struct DataStore {
    sensors: RwLock<Arc<SensorDataset>>,
    regions: RwLock<Arc<RegionDataset>>,
    // serialize writers so a read-modify-publish never loses a concurrent publish
    sensor_writer: Mutex<()>,
    region_writer: Mutex<()>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor_snapshot(&self) -> Arc<SensorDataset> {
        match self.sensors.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn region_snapshot(&self) -> Arc<RegionDataset> {
        match self.regions.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Build a replacement sensor dataset from the current one and publish
    /// it. The build runs outside the read/write lock.
    pub fn update_sensors<F, T>(&self, build: F) -> Result<T>
    where
        F: FnOnce(&SensorDataset) -> Result<(SensorDataset, T)>,
    {
        let _writer = self.sensor_writer.lock().unwrap_or_else(|p| p.into_inner());
        let current = self.sensor_snapshot();
        let (next, outcome) = build(&current)?;
        info!(
            "Publishing {} sensors with {} readings over {} timestamps",
            next.sensors.len(),
            next.actuals.len(),
            next.timestamps.len()
        );
        let next = Arc::new(next);
        match self.sensors.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(outcome)
    }

    pub fn update_regions<F, T>(&self, build: F) -> Result<T>
    where
        F: FnOnce(&RegionDataset) -> Result<(RegionDataset, T)>,
    {
        let _writer = self.region_writer.lock().unwrap_or_else(|p| p.into_inner());
        let current = self.region_snapshot();
        let (next, outcome) = build(&current)?;
        info!(
            "Publishing {} regions with {} estimates",
            next.regions.len(),
            next.estimates.len()
        );
        let next = Arc::new(next);
        match self.regions.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(outcome)
    }

    pub fn publish_sensors(&self, dataset: SensorDataset) -> Result<()> {
        self.update_sensors(|_| Ok((dataset, ())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GapError;
    use crate::models::ExtraData;
    use geo::Point;

    fn sensor(id: u64) -> Sensor {
        Sensor::new(id, Point::new(id as f64, 0.0), format!("S{}", id), ExtraData::new())
    }

    fn reading(day: u32, sensor: u64) -> ActualReading {
        ActualReading::new(
            NaiveDate::from_ymd_opt(2017, 1, day).unwrap(),
            sensor,
            Some(day as f64),
            ExtraData::new(),
        )
    }

    #[test]
    fn test_snapshots_survive_publish() -> Result<()> {
        let store = DataStore::new();
        store.publish_sensors(SensorDataset::new(vec![sensor(1)], vec![reading(1, 1)]))?;

        let old = store.sensor_snapshot();
        store.publish_sensors(SensorDataset::new(
            vec![sensor(1), sensor(2)],
            vec![reading(2, 1), reading(3, 2)],
        ))?;
        let new = store.sensor_snapshot();

        assert_eq!(old.sensors().len(), 1);
        assert_eq!(old.timestamps().len(), 1);
        assert_eq!(new.sensors().len(), 2);
        assert_eq!(new.timestamps().len(), 2);
        Ok(())
    }

    #[test]
    fn test_failed_build_leaves_dataset_untouched() -> Result<()> {
        let store = DataStore::new();
        store.publish_sensors(SensorDataset::new(vec![sensor(1)], vec![]))?;

        let result: Result<()> =
            store.update_sensors(|_| Err(GapError::InvalidFormat("boom".to_string())));
        assert!(result.is_err());
        assert_eq!(store.sensor_snapshot().sensors().len(), 1);
        Ok(())
    }

    #[test]
    fn test_lookup_by_identity() {
        let dataset = SensorDataset::new(vec![sensor(4), sensor(9)], vec![reading(1, 9), reading(2, 4)]);
        assert_eq!(dataset.sensor(9).map(|s| s.name.as_str()), Some("S9"));
        assert!(dataset.sensor(5).is_none());

        let day_one: Vec<u64> = dataset
            .actuals_at(NaiveDate::from_ymd_opt(2017, 1, 1).unwrap())
            .map(|r| r.sensor)
            .collect();
        assert_eq!(day_one, vec![9]);
    }

    #[test]
    fn test_concurrent_readers_see_whole_datasets() -> Result<()> {
        let store = Arc::new(DataStore::new());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = store.sensor_snapshot();
                        // every published dataset has one reading per sensor
                        assert_eq!(snapshot.sensors().len(), snapshot.actuals().len());
                    }
                })
            })
            .collect();

        for n in 1..=50u64 {
            let sensors = (1..=n).map(sensor).collect();
            let actuals = (1..=n).map(|id| reading(1, id)).collect();
            store.publish_sensors(SensorDataset::new(sensors, actuals))?;
        }

        for handle in readers {
            handle.join().expect("reader thread panicked");
        }
        Ok(())
    }
}
