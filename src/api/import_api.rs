//! Import API
//!
//! Reads an exported CSV file row by row and writes each record into a
//! project. Fatal problems (missing project files, unreadable input) are
//! returned as errors; per-row problems are logged and counted.

use anyhow::{bail, Context};
use clap::Parser;
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;

use crate::models::ImportSummary;
use crate::parser::parse_record;
use crate::storage::{ImportMode, ProjectDatabase};

/// Import configuration
#[derive(Debug, Clone, Parser)]
#[command(
    name = "caido_csv_import",
    version,
    about = "Import exported HTTP traffic from CSV into a Caido project"
)]
pub struct ImportConfig {
    /// Path to the Caido project directory
    #[arg(short = 'p', long = "project", value_name = "DIR")]
    pub project: PathBuf,

    /// Path to the CSV file to import
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: PathBuf,

    /// Wrap each record in its own transaction so a failed record leaves
    /// no partial rows
    #[arg(long)]
    pub atomic: bool,

    /// Set `PRAGMA foreign_keys = ON`. Parent ids carried over from the
    /// exporting project usually do not exist in the target, so rows with
    /// them fail under enforcement.
    #[arg(long = "foreign-keys")]
    pub foreign_keys: bool,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ImportConfig {
    /// Defaults for library callers: non-atomic, foreign keys not enforced,
    /// logs to stderr.
    pub fn new(project: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            file: file.into(),
            atomic: false,
            foreign_keys: false,
            log_dir: None,
        }
    }

    pub fn mode(&self) -> ImportMode {
        if self.atomic {
            ImportMode::PerRecordTransaction
        } else {
            ImportMode::Sequential
        }
    }
}

/// Initialize tracing.
///
/// Logs go to stderr unless `log_dir` is given, in which case they go to a
/// daily rolling file there. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let level = resolve_log_level();

    let Some(dir) = log_dir else {
        // Already-installed subscribers (tests, embedding hosts) are fine.
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(dir, "caido_csv_import");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init();
    Ok(Some(guard))
}

fn resolve_log_level() -> LevelFilter {
    std::env::var("RUST_LOG")
        .map(|val| parse_log_level(&val))
        .unwrap_or(LevelFilter::INFO)
}

fn parse_log_level(val: &str) -> LevelFilter {
    match val.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Import every record of `config.file` into `config.project`.
///
/// The project connection is closed before returning, on success and on
/// error alike.
pub fn import_csv(config: &ImportConfig) -> anyhow::Result<ImportSummary> {
    let mut db = ProjectDatabase::open(&config.project, config.foreign_keys)
        .context("failed to initialize project database")?;

    tracing::info!("Starting import from {}", config.file.display());
    let started = Instant::now();

    let result = File::open(&config.file)
        .with_context(|| format!("error opening CSV file {}", config.file.display()))
        .and_then(|file| import_from_reader(&mut db, file, config.mode()));
    let closed = db.close();

    let mut summary = result?;
    closed?;
    summary.elapsed = started.elapsed();

    tracing::info!(
        "Import completed in {}: {} imported, {} skipped, {} failed ({} rows)",
        summary.duration_str(),
        summary.imported,
        summary.skipped,
        summary.failed,
        summary.rows
    );
    Ok(summary)
}

/// Import records from any CSV source into an open project.
///
/// The first row is a header and is discarded unchecked; failing to read it
/// is fatal. Rows that cannot be read or parsed are skipped and records
/// whose inserts fail are counted, and the run moves on. An I/O error ends
/// the run early but still returns the summary, since the reader cannot
/// resume past it.
pub fn import_from_reader<R: Read>(
    db: &mut ProjectDatabase,
    source: R,
    mode: ImportMode,
) -> anyhow::Result<ImportSummary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let header = reader
        .byte_headers()
        .context("error reading header from CSV")?;
    if header.is_empty() {
        bail!("error reading header from CSV: file is empty");
    }

    let mut summary = ImportSummary::default();
    let mut row = ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                summary.rows += 1;
                summary.skipped += 1;
                tracing::warn!("Error reading record from CSV: {}", err);
                if err.is_io_error() {
                    tracing::warn!("Stopping after read failure; remaining rows not imported");
                    break;
                }
                continue;
            }
        }
        summary.rows += 1;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();

        let fields: Vec<&[u8]> = row.iter().collect();
        let record = match parse_record(&fields) {
            Ok(record) => record,
            Err(err) => {
                summary.skipped += 1;
                tracing::warn!("Error parsing CSV record on line {}: {}", line, err);
                continue;
            }
        };

        match db.import(&record, mode) {
            Ok(ids) => {
                summary.imported += 1;
                tracing::debug!("Line {} stored as request {}", line, ids.request_id);
            }
            Err(err) => {
                summary.failed += 1;
                tracing::error!("Error inserting data for host {}: {}", record.host(), err);
            }
        }
    }

    Ok(summary)
}
