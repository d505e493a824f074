use rusqlite::{params, Connection};
use std::fmt;
use thiserror::Error;

use crate::models::{ImportRecord, ImportedIds};

/// How a record's inserts are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Each insert commits on its own. A failure part-way leaves the rows
    /// of earlier stages behind.
    #[default]
    Sequential,
    /// All inserts for a record share one transaction.
    PerRecordTransaction,
}

/// The three stages of importing a record, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Response,
    Request,
    Intercept,
}

/// Tables written during an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    ResponsesRaw,
    Responses,
    RequestsRaw,
    RequestsMetadata,
    Requests,
    InterceptEntries,
}

impl Table {
    pub fn stage(self) -> ImportStage {
        match self {
            Table::ResponsesRaw | Table::Responses => ImportStage::Response,
            Table::RequestsRaw | Table::RequestsMetadata | Table::Requests => ImportStage::Request,
            Table::InterceptEntries => ImportStage::Intercept,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Table::ResponsesRaw => "raw.responses_raw",
            Table::Responses => "responses",
            Table::RequestsRaw => "raw.requests_raw",
            Table::RequestsMetadata => "requests_metadata",
            Table::Requests => "requests",
            Table::InterceptEntries => "intercept_entries",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("failed to insert into {table}: {source}")]
    Insert {
        table: Table,
        #[source]
        source: rusqlite::Error,
    },
    #[error("per-record transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),
}

impl InsertError {
    fn at(table: Table) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| InsertError::Insert { table, source }
    }

    pub(crate) fn transaction(source: rusqlite::Error) -> Self {
        InsertError::Transaction(source)
    }

    /// Table whose insert failed, if the failure came from an insert
    pub fn table(&self) -> Option<Table> {
        match self {
            InsertError::Insert { table, .. } => Some(*table),
            InsertError::Transaction(_) => None,
        }
    }

    pub fn stage(&self) -> Option<ImportStage> {
        self.table().map(Table::stage)
    }
}

/// Import one record: response, then request, then the intercept entry.
///
/// The order is fixed because each stage needs the id produced by the one
/// before it. Stops at the first failing insert.
pub fn import_record(conn: &Connection, record: &ImportRecord) -> Result<ImportedIds, InsertError> {
    let (raw_response_id, response_id) = insert_response(conn, record)?;
    let (raw_request_id, metadata_id, request_id) = insert_request(conn, response_id, record)?;
    let intercept_id = insert_intercept(conn, request_id)?;

    tracing::info!("Successfully inserted request for host: {}", record.host());
    Ok(ImportedIds {
        raw_response_id,
        response_id,
        raw_request_id,
        metadata_id,
        request_id,
        intercept_id,
    })
}

/// Insert the raw response and its `responses` row.
///
/// Returns `(raw_id, response_id)`. Round-trip time is not part of the
/// export and is always stored as zero.
pub fn insert_response(conn: &Connection, record: &ImportRecord) -> Result<(i64, i64), InsertError> {
    let response = &record.response;
    let raw_id: i64 = conn
        .query_row(
            "INSERT INTO raw.responses_raw (data, source, alteration)
             VALUES (?1, ?2, ?3) RETURNING id",
            params![response.raw, record.source, response.alteration],
            |row| row.get(0),
        )
        .map_err(InsertError::at(Table::ResponsesRaw))?;

    let response_id: i64 = conn
        .query_row(
            "INSERT INTO responses
               (status_code, raw_id, length, alteration, edited, parent_id, created_at, roundtrip_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0) RETURNING id",
            params![
                response.status_code,
                raw_id,
                response.length,
                response.alteration,
                response.edited,
                response.parent_id,
                response.created_at,
            ],
            |row| row.get(0),
        )
        .map_err(InsertError::at(Table::Responses))?;

    Ok((raw_id, response_id))
}

/// Insert the raw request, a fresh metadata row, and the `requests` row
/// pointing at `response_id`.
///
/// Returns `(raw_id, metadata_id, request_id)`.
pub fn insert_request(
    conn: &Connection,
    response_id: i64,
    record: &ImportRecord,
) -> Result<(i64, i64, i64), InsertError> {
    let request = &record.request;
    let raw_id: i64 = conn
        .query_row(
            "INSERT INTO raw.requests_raw (data, source, alteration)
             VALUES (?1, ?2, ?3) RETURNING id",
            params![request.raw, record.source, request.alteration],
            |row| row.get(0),
        )
        .map_err(InsertError::at(Table::RequestsRaw))?;

    let metadata_id: i64 = conn
        .query_row(
            "INSERT INTO requests_metadata DEFAULT VALUES RETURNING id",
            [],
            |row| row.get(0),
        )
        .map_err(InsertError::at(Table::RequestsMetadata))?;

    let request_id: i64 = conn
        .query_row(
            "INSERT INTO requests
               (host, method, path, length, port, is_tls, raw_id, query, response_id,
                source, alteration, edited, parent_id, created_at, metadata_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             RETURNING id",
            params![
                request.host,
                request.method,
                request.path,
                request.length,
                request.port,
                request.is_tls,
                raw_id,
                request.query,
                response_id,
                record.source,
                request.alteration,
                request.edited,
                request.parent_id,
                request.created_at,
                metadata_id,
            ],
            |row| row.get(0),
        )
        .map_err(InsertError::at(Table::Requests))?;

    Ok((raw_id, metadata_id, request_id))
}

/// Register a request in the intercept view.
pub fn insert_intercept(conn: &Connection, request_id: i64) -> Result<i64, InsertError> {
    conn.query_row(
        "INSERT INTO intercept_entries (request_id) VALUES (?1) RETURNING id",
        params![request_id],
        |row| row.get(0),
    )
    .map_err(InsertError::at(Table::InterceptEntries))
}
