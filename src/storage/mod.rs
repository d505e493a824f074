//! Project storage
//!
//! A Caido project keeps its traffic in two SQLite files. The main file holds
//! requests, responses and the intercept view; the raw file holds the
//! verbatim bytes. Both are opened through a single connection, with the raw
//! file attached under the `raw` schema name.

pub mod importer;

use anyhow::Context;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{ImportRecord, ImportedIds};

pub use importer::{import_record, insert_intercept, insert_request, insert_response};
pub use importer::{ImportMode, ImportStage, InsertError, Table};

/// Main project database file name
pub const MAIN_DB_FILE: &str = "database.caido";
/// Raw payload database file name
pub const RAW_DB_FILE: &str = "database_raw.caido";
/// Schema name the raw database is attached under
pub const RAW_SCHEMA: &str = "raw";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("caido main database does not exist at {}", .0.display())]
    MissingMainDatabase(PathBuf),
    #[error("caido raw database does not exist at {}", .0.display())]
    MissingRawDatabase(PathBuf),
}

/// Open handle on a project's databases.
///
/// Owns the only connection used during an import run. Dropping it closes
/// the connection; [`ProjectDatabase::close`] does the same but reports
/// errors.
pub struct ProjectDatabase {
    conn: Connection,
}

impl ProjectDatabase {
    /// Open `database.caido` and attach `database_raw.caido` from a project
    /// directory. Neither file is created if missing.
    pub fn open(project_dir: impl AsRef<Path>, enforce_foreign_keys: bool) -> anyhow::Result<Self> {
        let dir = project_dir.as_ref();
        let main_path = dir.join(MAIN_DB_FILE);
        if !main_path.is_file() {
            return Err(ProjectError::MissingMainDatabase(main_path).into());
        }
        let raw_path = dir.join(RAW_DB_FILE);
        if !raw_path.is_file() {
            return Err(ProjectError::MissingRawDatabase(raw_path).into());
        }

        let conn = Connection::open(&main_path)
            .with_context(|| format!("opening {}", main_path.display()))?;
        tracing::info!("Opened {}", MAIN_DB_FILE);

        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", RAW_SCHEMA),
            params![attach_target(&raw_path)?],
        )
        .with_context(|| format!("attaching {}", raw_path.display()))?;
        tracing::info!("Attached {}", RAW_DB_FILE);

        if enforce_foreign_keys {
            conn.pragma_update(None, "foreign_keys", true)
                .context("enabling foreign key enforcement")?;
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Import one record, honouring the transaction mode.
    ///
    /// In [`ImportMode::PerRecordTransaction`] a failure rolls back every row
    /// written for the record; otherwise rows from completed stages remain.
    pub fn import(
        &mut self,
        record: &ImportRecord,
        mode: ImportMode,
    ) -> Result<ImportedIds, InsertError> {
        match mode {
            ImportMode::Sequential => import_record(&self.conn, record),
            ImportMode::PerRecordTransaction => {
                let tx = self.conn.transaction().map_err(InsertError::transaction)?;
                // Dropping an uncommitted transaction rolls it back.
                let ids = import_record(&tx, record)?;
                tx.commit().map_err(InsertError::transaction)?;
                Ok(ids)
            }
        }
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .context("closing project database")
    }
}

/// Filename argument for `ATTACH`, as the path's native bytes.
///
/// SQLite reads the bound blob back as the filename text, so Unix paths
/// that are not valid UTF-8 still attach.
#[cfg(unix)]
fn attach_target(path: &Path) -> anyhow::Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes().to_vec())
}

#[cfg(not(unix))]
fn attach_target(path: &Path) -> anyhow::Result<Vec<u8>> {
    path.to_str()
        .map(|s| s.as_bytes().to_vec())
        .with_context(|| format!("raw database path is not valid UTF-8: {:?}", path))
}
