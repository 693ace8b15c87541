use std::fs;

use anyhow::Result;
use log::{error, info, warn};

use lazylib_import::{
    config::Config,
    csv::{CsvWriter, Table},
    error::ImportError,
    keepalive::KeepAlive,
    library::{HttpLibraryClient, LibraryApi},
    reconcile::{ReconcilerBuilder, RunReport},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;

    let keep_alive = KeepAlive::start();
    tokio::select! {
        result = run(&config) => {
            keep_alive.cancel();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Caught interrupt signal");
            keep_alive.cancel();
        }
    }

    Ok(())
}

async fn run(config: &Config) -> Result<(), ImportError> {
    let client = HttpLibraryClient::new(&config.base_url, &config.api_key);

    let catalog = client.all_books().await?;
    if catalog.is_empty() {
        warn!("No books found from library. Continuing without comparing books.");
        return Ok(());
    }

    let text = fs::read_to_string(&config.input_file)
        .map_err(|error| ImportError::InputFile(format!("{}: {error}", config.input_file.display())))?;
    let table = Table::parse(&text);
    info!("Finished parsing CSV. Number of rows: {}", table.rows().len());

    let report = ReconcilerBuilder::new()
        .name("to-read-import")
        .target_shelf(&config.target_shelf)
        .start_index(config.start_index)
        .build(&client)
        .run(table, &catalog)
        .await;

    // A failed output write is logged, not fatal: the queueing work is
    // already done on the library side
    if let Err(err) = write_output(config, &report) {
        error!("Error writing to output file: {err}");
    }

    Ok(())
}

fn write_output(config: &Config, report: &RunReport) -> Result<(), ImportError> {
    let writer = CsvWriter::from_path(&config.output_file)?;
    writer.write_header(&report.headers)?;
    for row in &report.rows {
        writer.write_row(row)?;
    }
    writer.flush()
}
