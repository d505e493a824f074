//! Command-line importer.
//!
//! Usage:
//! ```text
//! caido_csv_import -p ~/.local/share/caido/projects/<id> -f traffic.csv
//! ```

use std::process::ExitCode;

use caido_csv_import::api::{import_csv, init_logging, ImportConfig};
use clap::Parser;

fn main() -> ExitCode {
    let config = ImportConfig::parse();

    let _guard = match init_logging(config.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match import_csv(&config) {
        Ok(summary) => {
            if !summary.is_clean() {
                tracing::warn!(
                    "{} row(s) skipped and {} record(s) failed, see log for details",
                    summary.skipped,
                    summary.failed
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to import data: {:#}", e);
            if config.log_dir.is_some() {
                eprintln!("caido_csv_import error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
