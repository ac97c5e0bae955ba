use clap::Parser;
use geo_sensor_gaps::cli::{init_logging, run, Cli};
use geo_sensor_gaps::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    run(cli).await
}
