//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file,
//! then `GEO_GAPS_*` environment variables (`__` separates nested keys,
//! e.g. `GEO_GAPS_ESTIMATION__IDW_POWER=3`). List settings take `;`
//! separated values, e.g. `GEO_GAPS_DATE_FORMATS=%d.%m.%Y;%Y-%m-%d`.

use crate::error::{GapError, Result};
use crate::utils::constants::{
    DEFAULT_CENTER, DEFAULT_CONFIG_FILE, DEFAULT_DATE_FORMATS, DEFAULT_DIFFUSION_MAX_RINGS,
    DEFAULT_ENCODING, DEFAULT_IDW_POWER, ENV_PREFIX,
};
use config::{Config, Environment, File};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

const LIST_SEPARATOR: &str = ";";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Label understood by `encoding_rs` (e.g. `utf-8`, `windows-1252`).
    #[validate(length(min = 1))]
    pub encoding: String,

    pub use_mmap: bool,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    #[validate(length(min = 1))]
    pub date_formats: Vec<String>,

    /// (lat, lon)
    pub default_center: [f64; 2],

    #[validate(nested)]
    pub estimation: EstimationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EstimationSettings {
    #[validate(range(min = 0.1, max = 10.0))]
    pub idw_power: f64,

    #[validate(range(min = 1, max = 100))]
    pub diffusion_max_rings: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            use_mmap: false,
            max_workers: num_cpus::get(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            default_center: DEFAULT_CENTER,
            estimation: EstimationSettings::default(),
        }
    }
}

impl Default for EstimationSettings {
    fn default() -> Self {
        Self {
            idw_power: DEFAULT_IDW_POWER,
            diffusion_max_rings: DEFAULT_DIFFUSION_MAX_RINGS,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise
    /// `geo-sensor-gaps.toml` in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(LIST_SEPARATOR)
                    .with_list_parse_key("date_formats")
                    .with_list_parse_key("default_center"),
            )
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// Validate ranges and resolve the encoding label.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.text_encoding()?;
        Ok(())
    }

    pub fn text_encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| GapError::Encoding(self.encoding.clone()))
    }
}
