use crate::processors::selector::{parse_criteria_or_empty, Criterion};
use crate::processors::InputFiles;
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geo-sensor-gaps")]
#[command(about = "Estimate regional values from sparse point-sensor readings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: geo-sensor-gaps.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

/// The four input files. Each pair is ingested together.
#[derive(Args, Debug, Clone, Default)]
pub struct DataFiles {
    #[arg(short, long, help = "Sensor file: long, lat, name, extra...")]
    pub sensors: Option<PathBuf>,

    #[arg(short, long, help = "Actual reading file: timestamp, long, lat, value, extra...")]
    pub actuals: Option<PathBuf>,

    #[arg(short, long, help = "Region file: region_id, geometry, extra...")]
    pub regions: Option<PathBuf>,

    #[arg(short, long, help = "Estimated reading file: timestamp, region_id, value, extra...")]
    pub estimates: Option<PathBuf>,
}

impl From<DataFiles> for InputFiles {
    fn from(files: DataFiles) -> Self {
        InputFiles {
            sensors: files.sensors,
            actuals: files.actuals,
            regions: files.regions,
            estimates: files.estimates,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    #[arg(
        long,
        help = "Sensor selectors as JSON, e.g. '{\"selectors\": [{\"name\": {\"omit_sensors\": [\"Inverness\"]}}]}'"
    )]
    pub selectors: Option<String>,

    #[arg(long, conflicts_with = "selectors", help = "Read sensor selectors from a JSON file")]
    pub selectors_file: Option<PathBuf>,
}

impl SelectorArgs {
    /// Malformed selectors select every sensor.
    pub fn criteria(&self) -> Result<Vec<Criterion>> {
        let body = match (&self.selectors, &self.selectors_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => return Ok(Vec::new()),
        };
        Ok(parse_criteria_or_empty(&body))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Region values at one timestamp, persisted or estimated
    Estimates {
        #[command(flatten)]
        data: DataFiles,

        #[arg(short, long, default_value = "file", help = "'file' or a registered estimation method")]
        method: String,

        #[arg(short, long, default_value = "0", help = "Zero-based timestamp index")]
        timestamp: usize,

        #[command(flatten)]
        selectors: SelectorArgs,

        #[arg(short, long, help = "Write rows to a JSON file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Actual readings at one timestamp with scores and selection flags
    Actuals {
        #[command(flatten)]
        data: DataFiles,

        #[arg(short, long, default_value = "0", help = "Zero-based timestamp index")]
        timestamp: usize,

        #[command(flatten)]
        selectors: SelectorArgs,

        #[arg(short, long, help = "Write rows to a JSON file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// List the distinct reading timestamps in index order
    Timestamps {
        #[command(flatten)]
        data: DataFiles,
    },

    /// List the sensor attributes selectors can refer to
    Fields {
        #[command(flatten)]
        data: DataFiles,
    },

    /// Mean sensor position as [lat, lon]
    Center {
        #[command(flatten)]
        data: DataFiles,
    },

    /// List the estimation methods
    Methods,

    /// Write one ingested collection back out
    Export {
        #[command(flatten)]
        data: DataFiles,

        #[arg(short, long, help = "sensors, actuals, regions or estimates")]
        kind: String,

        #[arg(short, long, default_value = "csv", help = "csv, json or geojson")]
        format: String,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/{kind}-{YYMMDD}.{ext}]"
        )]
        output: Option<PathBuf>,
    },

    /// Ingest the input files and report skipped rows
    Validate {
        #[command(flatten)]
        data: DataFiles,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_estimates() {
        let cli = Cli::try_parse_from([
            "geo-sensor-gaps",
            "estimates",
            "--sensors",
            "s.csv",
            "--actuals",
            "a.csv",
            "--regions",
            "r.csv",
            "--method",
            "inverse-distance",
            "--timestamp",
            "3",
            "--selectors",
            "[{\"name\": {\"select_sensors\": [\"A\"]}}]",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Estimates {
                data,
                method,
                timestamp,
                selectors,
                output,
            } => {
                assert_eq!(method, "inverse-distance");
                assert_eq!(timestamp, 3);
                assert_eq!(data.sensors, Some(PathBuf::from("s.csv")));
                assert!(data.estimates.is_none());
                assert_eq!(selectors.criteria().unwrap().len(), 1);
                assert!(output.is_none());
            }
            _ => panic!("expected estimates"),
        }
    }

    #[test]
    fn test_selectors_conflict() {
        let result = Cli::try_parse_from([
            "geo-sensor-gaps",
            "actuals",
            "--selectors",
            "[]",
            "--selectors-file",
            "sel.json",
        ]);
        assert!(result.is_err());
    }
}
