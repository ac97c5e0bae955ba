use crate::config::Settings;
use crate::error::Result;
use crate::processors::IngestReport;
use crate::readers::{RegionReader, SensorReader, SourceReader};
use crate::store::{DataStore, RegionDataset, SensorDataset};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Paths of the four input files. Either file of a pair may be absent.
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    pub sensors: Option<PathBuf>,
    pub actuals: Option<PathBuf>,
    pub regions: Option<PathBuf>,
    pub estimates: Option<PathBuf>,
}

impl InputFiles {
    pub fn is_empty(&self) -> bool {
        self.sensors.is_none()
            && self.actuals.is_none()
            && self.regions.is_none()
            && self.estimates.is_none()
    }
}

/// Reads input files and publishes the resulting datasets to a store.
///
/// Sensors replace the whole sensor side: readings refer to sensor
/// identities, so ingesting sensors alone leaves no readings behind.
/// Ingesting readings alone keeps the current sensors. The region side
/// behaves the same way and is independent of the sensor side.
pub struct Ingestor {
    store: Arc<DataStore>,
    source: SourceReader,
    sensor_reader: SensorReader,
    region_reader: RegionReader,
    pool: rayon::ThreadPool,
}

impl Ingestor {
    pub fn new(store: Arc<DataStore>, max_workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers.max(1))
            .build()?;

        Ok(Self {
            store,
            source: SourceReader::default(),
            sensor_reader: SensorReader::new(),
            region_reader: RegionReader::new(),
            pool,
        })
    }

    pub fn from_settings(store: Arc<DataStore>, settings: &Settings) -> Result<Self> {
        let mut ingestor = Self::new(store, settings.max_workers)?;
        ingestor.source = SourceReader::from_settings(settings)?;
        ingestor.sensor_reader = SensorReader::with_date_formats(settings.date_formats.clone());
        ingestor.region_reader = RegionReader::with_date_formats(settings.date_formats.clone());
        Ok(ingestor)
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Replace all sensors. Existing readings are dropped with them.
    pub fn ingest_sensors<R: Read + Send>(&self, input: R) -> Result<IngestReport> {
        let mut reports = self.ingest_sensor_pair(input, None::<&[u8]>)?;
        Ok(reports.remove(0))
    }

    /// Replace all actual readings, matched against the current sensors.
    pub fn ingest_actuals<R: Read + Send>(&self, input: R) -> Result<IngestReport> {
        self.store.update_sensors(|current| {
            let ingested = self
                .pool
                .install(|| self.sensor_reader.read_actuals(input, current.sensors()))?;
            ingested.report.log();

            let dataset = SensorDataset::new(current.sensors().to_vec(), ingested.records);
            Ok((dataset, ingested.report))
        })
    }

    /// Replace sensors and, when given, their readings in one publish.
    pub fn ingest_sensor_pair<S, A>(&self, sensors: S, actuals: Option<A>) -> Result<Vec<IngestReport>>
    where
        S: Read + Send,
        A: Read + Send,
    {
        self.store.update_sensors(|_| {
            let sensors = self.pool.install(|| self.sensor_reader.read_sensors(sensors))?;
            sensors.report.log();
            let mut reports = vec![sensors.report];

            let actuals = match actuals {
                Some(input) => {
                    let ingested = self
                        .pool
                        .install(|| self.sensor_reader.read_actuals(input, &sensors.records))?;
                    ingested.report.log();
                    reports.push(ingested.report);
                    ingested.records
                }
                None => Vec::new(),
            };

            Ok((SensorDataset::new(sensors.records, actuals), reports))
        })
    }

    /// Replace all regions. Existing estimates are dropped with them.
    pub fn ingest_regions<R: Read + Send>(&self, input: R) -> Result<IngestReport> {
        let mut reports = self.ingest_region_pair(input, None::<&[u8]>)?;
        Ok(reports.remove(0))
    }

    /// Replace all estimated readings, matched against the current regions.
    pub fn ingest_estimates<R: Read + Send>(&self, input: R) -> Result<IngestReport> {
        self.store.update_regions(|current| {
            let ingested = self
                .pool
                .install(|| self.region_reader.read_estimates(input, current.regions()))?;
            ingested.report.log();

            let dataset = RegionDataset::new(current.regions().to_vec(), ingested.records);
            Ok((dataset, ingested.report))
        })
    }

    /// Replace regions and, when given, their estimates in one publish.
    pub fn ingest_region_pair<G, E>(&self, regions: G, estimates: Option<E>) -> Result<Vec<IngestReport>>
    where
        G: Read + Send,
        E: Read + Send,
    {
        self.store.update_regions(|_| {
            let regions = self.pool.install(|| self.region_reader.read_regions(regions))?;
            regions.report.log();
            let mut reports = vec![regions.report];

            let estimates = match estimates {
                Some(input) => {
                    let ingested = self
                        .pool
                        .install(|| self.region_reader.read_estimates(input, &regions.records))?;
                    ingested.report.log();
                    reports.push(ingested.report);
                    ingested.records
                }
                None => Vec::new(),
            };

            Ok((RegionDataset::new(regions.records, estimates), reports))
        })
    }

    /// Ingest the sensor side from files. Either path may be absent.
    pub fn ingest_sensor_files(&self, sensors: Option<&Path>, actuals: Option<&Path>) -> Result<Vec<IngestReport>> {
        let actuals_text = actuals.map(|p| self.source.read_to_string(p)).transpose()?;

        match sensors {
            Some(path) => {
                let sensors_text = self.source.read_to_string(path)?;
                self.ingest_sensor_pair(
                    sensors_text.as_bytes(),
                    actuals_text.as_ref().map(|t| t.as_bytes()),
                )
            }
            None => match actuals_text {
                Some(text) => Ok(vec![self.ingest_actuals(text.as_bytes())?]),
                None => Ok(Vec::new()),
            },
        }
    }

    /// Ingest the region side from files. Either path may be absent.
    pub fn ingest_region_files(&self, regions: Option<&Path>, estimates: Option<&Path>) -> Result<Vec<IngestReport>> {
        let estimates_text = estimates.map(|p| self.source.read_to_string(p)).transpose()?;

        match regions {
            Some(path) => {
                let regions_text = self.source.read_to_string(path)?;
                self.ingest_region_pair(
                    regions_text.as_bytes(),
                    estimates_text.as_ref().map(|t| t.as_bytes()),
                )
            }
            None => match estimates_text {
                Some(text) => Ok(vec![self.ingest_estimates(text.as_bytes())?]),
                None => Ok(Vec::new()),
            },
        }
    }

    /// Ingest both sides concurrently; they touch disjoint datasets.
    pub async fn ingest_all(self: Arc<Self>, inputs: InputFiles) -> Result<Vec<IngestReport>> {
        let sensor_task = {
            let this = Arc::clone(&self);
            let (sensors, actuals) = (inputs.sensors.clone(), inputs.actuals.clone());
            tokio::task::spawn_blocking(move || {
                this.ingest_sensor_files(sensors.as_deref(), actuals.as_deref())
            })
        };

        let region_task = {
            let this = Arc::clone(&self);
            let (regions, estimates) = (inputs.regions.clone(), inputs.estimates.clone());
            tokio::task::spawn_blocking(move || {
                this.ingest_region_files(regions.as_deref(), estimates.as_deref())
            })
        };

        let (sensor_reports, region_reports) = tokio::try_join!(sensor_task, region_task)?;

        let mut reports = sensor_reports?;
        reports.extend(region_reports?);
        Ok(reports)
    }
}
