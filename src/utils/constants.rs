/// Method name that returns persisted estimates instead of interpolating
pub const FILE_METHOD: &str = "file";
pub const FILE_METHOD_DESCRIPTION: &str = "Estimates read from the estimates file";

/// Leading columns per input file; everything after them is extra data
pub const SENSOR_FIXED_COLUMNS: usize = 3;
pub const ACTUAL_FIXED_COLUMNS: usize = 4;
pub const REGION_FIXED_COLUMNS: usize = 2;
pub const ESTIMATE_FIXED_COLUMNS: usize = 3;

/// Map centre used when no sensors are loaded (lat, lon)
pub const DEFAULT_CENTER: [f64; 2] = [54.2361, -4.5481];

/// Date formats tried in order for reading timestamps
pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];
pub const DEFAULT_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Estimation defaults
pub const DEFAULT_IDW_POWER: f64 = 2.0;
pub const DEFAULT_DIFFUSION_MAX_RINGS: usize = 5;
/// Observations closer than this (km) to a target are taken verbatim
pub const COINCIDENT_DISTANCE_KM: f64 = 0.001;

/// Processing defaults
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_CONFIG_FILE: &str = "geo-sensor-gaps.toml";
pub const ENV_PREFIX: &str = "GEO_GAPS";
/// Sample messages retained per ingest report
pub const REPORT_SAMPLE_LIMIT: usize = 10;

/// Region geometry type tag written on export
pub const MULTIPOLYGON_TAG: &str = "MULTIPOLYGON";
