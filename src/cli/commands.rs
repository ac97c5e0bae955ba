use crate::cli::args::{Cli, Commands, DataFiles};
use crate::config::Settings;
use crate::error::{GapError, Result};
use crate::models::RecordKind;
use crate::processors::{IngestReport, Ingestor, InputFiles};
use crate::query::QueryEngine;
use crate::store::DataStore;
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{self, ExportFormat, JsonWriter};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    // spinners would garble a terminal that is not showing the log
    let silent = cli.log_file.is_some();

    match cli.command {
        Commands::Estimates {
            data,
            method,
            timestamp,
            selectors,
            output,
        } => {
            let criteria = selectors.criteria()?;
            let (store, _) = load_store(&settings, data, silent).await?;
            let engine = QueryEngine::new(store, &settings);

            let rows = engine.estimates_at(&method, timestamp, &criteria);
            info!(
                "{} '{}' estimates for timestamp #{}",
                rows.len(),
                method,
                timestamp
            );
            emit(&rows, output.as_deref())?;
        }

        Commands::Actuals {
            data,
            timestamp,
            selectors,
            output,
        } => {
            let criteria = selectors.criteria()?;
            let (store, _) = load_store(&settings, data, silent).await?;
            let engine = QueryEngine::new(store, &settings);

            let rows = engine.actuals_at(timestamp, &criteria);
            let ignored = rows.iter().filter(|row| row.ignore).count();
            info!(
                "{} actual readings for timestamp #{} ({} ignored by selectors)",
                rows.len(),
                timestamp,
                ignored
            );
            emit(&rows, output.as_deref())?;
        }

        Commands::Timestamps { data } => {
            let (store, _) = load_store(&settings, data, silent).await?;
            let engine = QueryEngine::new(store, &settings);
            emit(&engine.timestamps(), None)?;
        }

        Commands::Fields { data } => {
            let (store, _) = load_store(&settings, data, silent).await?;
            let engine = QueryEngine::new(store, &settings);
            emit(&engine.sensor_fields(), None)?;
        }

        Commands::Center { data } => {
            let (store, _) = load_store(&settings, data, silent).await?;
            let engine = QueryEngine::new(store, &settings);
            emit(&engine.center(), None)?;
        }

        Commands::Methods => {
            let engine = QueryEngine::new(Arc::new(DataStore::new()), &settings);
            emit(&engine.method_descriptions(), None)?;
        }

        Commands::Export {
            data,
            kind,
            format,
            output,
        } => {
            let kind = RecordKind::from_name(&kind)
                .ok_or_else(|| GapError::InvalidFormat(format!("Unknown collection: '{}'", kind)))?;
            let format = ExportFormat::from_name(&format)
                .ok_or_else(|| GapError::InvalidFormat(format!("Unknown export format: '{}'", format)))?;
            let output =
                output.unwrap_or_else(|| generate_default_export_filename(kind.name(), format.extension()));

            let (store, _) = load_store(&settings, data, silent).await?;

            create_parent_dir(&output)?;
            let file = BufWriter::new(File::create(&output)?);
            writers::export(&store, kind, format, file)?;

            println!("Wrote {} as {} to {}", kind, format.extension(), output.display());
        }

        Commands::Validate { data } => {
            let (_, reports) = load_store(&settings, data, silent).await?;
            if reports.is_empty() {
                println!("No input files given");
                return Ok(());
            }

            for report in &reports {
                println!("{}", report.summary());
            }

            let skipped: usize = reports.iter().map(IngestReport::skipped_total).sum();
            if skipped == 0 {
                println!("✅ All rows ingested");
            } else {
                println!("⚠️  {} rows skipped", skipped);
            }
        }
    }

    Ok(())
}

/// Ingest whatever input files were given into a fresh store.
async fn load_store(settings: &Settings, data: DataFiles, silent: bool) -> Result<(Arc<DataStore>, Vec<IngestReport>)> {
    let store = Arc::new(DataStore::new());
    let inputs = InputFiles::from(data);
    if inputs.is_empty() {
        warn!("No input files given; working on an empty dataset");
        return Ok((store, Vec::new()));
    }

    let progress = ProgressReporter::new_spinner("Ingesting input files...", silent);
    let ingestor = Arc::new(Ingestor::from_settings(Arc::clone(&store), settings)?);
    let reports = ingestor.ingest_all(inputs).await?;

    let rows: usize = reports.iter().map(|r| r.ingested).sum();
    progress.finish_with_message(&format!("Ingested {} rows from {} files", rows, reports.len()));

    Ok((store, reports))
}

fn emit<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let writer = JsonWriter::new();
    match output {
        Some(path) => {
            create_parent_dir(path)?;
            writer.write_file(path, value)?;
            info!("Wrote {}", path.display());
            Ok(())
        }
        None => writer.write(std::io::stdout().lock(), value),
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
